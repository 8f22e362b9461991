use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed three-value label set assigned to a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Index order of the FinBERT classification head.
    pub const MODEL_LABELS: [Sentiment; 3] =
        [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Order used for chart series and distribution tables.
    pub const DISPLAY_ORDER: [Sentiment; 3] =
        [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }

    pub fn from_model_index(idx: usize) -> Option<Self> {
        Self::MODEL_LABELS.get(idx).copied()
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Negative" => Ok(Self::Negative),
            "Neutral" => Ok(Self::Neutral),
            "Positive" => Ok(Self::Positive),
            other => anyhow::bail!("unknown sentiment label: {other:?}"),
        }
    }
}

/// Per-day tally of sentiment labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl LabelCounts {
    pub fn add(&mut self, label: Sentiment) {
        match label {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn get(&self, label: Sentiment) -> u32 {
        match label {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    /// Share of each label in percent. A day with no headlines yields 0 for every
    /// label rather than NaN.
    pub fn percentages(&self) -> LabelPercentages {
        let total = self.total();
        let pct = |count: u32| {
            if total == 0 {
                0.0
            } else {
                f64::from(count) / f64::from(total) * 100.0
            }
        };

        LabelPercentages {
            positive: pct(self.positive),
            neutral: pct(self.neutral),
            negative: pct(self.negative),
        }
    }
}

impl FromIterator<Sentiment> for LabelCounts {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Self {
        let mut out = Self::default();
        for label in iter {
            out.add(label);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelPercentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl LabelPercentages {
    pub fn get(&self, label: Sentiment) -> f64 {
        match label {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }
}
