//! Captions for rendered maps.

pub const MOTIVATIONAL_QUOTES: &[&str] = &[
    "The secret to getting ahead is getting started.",
    "Believe you can and you're halfway there.",
    "It does not matter how slowly you go as long as you do not stop.",
    "The expert in anything was once a beginner.",
    "The future belongs to those who believe in the beauty of their dreams.",
    "Well done is better than well said.",
    "Keep going, you're closer than you think!",
    "Success is the sum of small efforts, repeated day in and day out.",
    "The only way to do great work is to love what you do.",
];

/// Source of the optional caption drawn under a map.
pub trait QuoteProvider: Send + Sync {
    fn quote(&self) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct NoQuote;

impl QuoteProvider for NoQuote {
    fn quote(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FixedQuote(pub String);

impl QuoteProvider for FixedQuote {
    fn quote(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Picks one entry of a list; the same seed always yields the same quote.
#[derive(Debug, Clone)]
pub struct QuoteList {
    quotes: Vec<String>,
    seed: u64,
}

impl QuoteList {
    pub fn new(quotes: Vec<String>, seed: u64) -> Self {
        Self { quotes, seed }
    }

    pub fn motivational(seed: u64) -> Self {
        Self::new(
            MOTIVATIONAL_QUOTES.iter().map(|q| q.to_string()).collect(),
            seed,
        )
    }
}

impl QuoteProvider for QuoteList {
    fn quote(&self) -> Option<String> {
        if self.quotes.is_empty() {
            return None;
        }
        let index = (self.seed % self.quotes.len() as u64) as usize;
        self.quotes.get(index).cloned()
    }
}
