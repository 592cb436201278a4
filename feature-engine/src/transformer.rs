use crate::sentiment::{LexiconSentimentScorer, Sentiment, SentimentScorer};
use rust_bert::pipelines::sentiment::{SentimentModel, SentimentPolarity};
use rust_bert::RustBertError;
use std::sync::Mutex;
use tracing::{info, warn};

/// Signed polarity from a fine-tuned DistilBERT sentiment model. The model
/// has no notion of subjectivity, so that half still comes from the lexicon.
pub struct TransformerSentimentScorer {
    model: Mutex<SentimentModel>,
    lexicon: LexiconSentimentScorer,
}

impl TransformerSentimentScorer {
    /// Fetches the default SST-2 weights into the rust-bert cache on first use.
    pub fn new(lexicon: LexiconSentimentScorer) -> Result<Self, RustBertError> {
        let model = SentimentModel::new(Default::default())?;
        info!("Loaded transformer sentiment model");
        Ok(Self {
            model: Mutex::new(model),
            lexicon,
        })
    }
}

impl SentimentScorer for TransformerSentimentScorer {
    fn score(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::default();
        }
        let lexical = self.lexicon.score(text);
        let Ok(model) = self.model.lock() else {
            warn!("Sentiment model lock poisoned, scoring with the lexicon only");
            return lexical;
        };

        let polarity = model
            .predict(&[text])
            .first()
            .map(|prediction| match prediction.polarity {
                SentimentPolarity::Positive => prediction.score,
                SentimentPolarity::Negative => -prediction.score,
            })
            .unwrap_or(0.0);

        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: lexical.subjectivity,
        }
    }
}
