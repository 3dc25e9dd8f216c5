/*! Tokenizer interface.

Token-level preprocessing (minimum token counts, stop word removal,
lemmatization) depends on an external NLP tokenizer. Implementations
are injected behind [`Tokenize`]; when none is configured, the
dependent options become bypasses instead of errors.
!*/

/// One token as reported by an external tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    text: String,
    lemma: String,
    is_alpha: bool,
    is_punct: bool,
    is_stop: bool,
}

impl Token {
    pub fn new(text: String, lemma: String, is_alpha: bool, is_punct: bool, is_stop: bool) -> Self {
        Self {
            text,
            lemma,
            is_alpha,
            is_punct,
            is_stop,
        }
    }

    /// Get a reference to the token's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get a reference to the token's lemma.
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn is_alpha(&self) -> bool {
        self.is_alpha
    }

    pub fn is_punct(&self) -> bool {
        self.is_punct
    }

    pub fn is_stop(&self) -> bool {
        self.is_stop
    }
}

/// External tokenizers implement this to drive token-level
/// preprocessing.
pub trait Tokenize {
    /// Splits `text` into tokens, in order.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}
