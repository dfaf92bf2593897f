//! Interactive prompt → continuation session.

use anyhow::Result;
use ngramlab_llm::{Generation, GenerationOptions, LanguageModel, ModelConfig};
use std::io::{BufRead, Write};
use tracing::info;

/// Outcome of one line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Quit,
    /// Blank input; nothing to do.
    Skip,
    /// The prompt has fewer words than the model's context window.
    TooShort { required: usize },
    Output(String),
    /// Generation failed (e.g. an unknown word); the session keeps going.
    Error(String),
}

pub struct ChatSession {
    model: LanguageModel,
    options: GenerationOptions,
    rng: fastrand::Rng,
}

impl ChatSession {
    pub fn new(model: LanguageModel, options: GenerationOptions, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            model,
            options,
            rng,
        }
    }

    /// Trains a model on `texts` and wraps it with the config's generation settings.
    pub fn train<S: AsRef<str>>(texts: &[S], config: ModelConfig) -> Result<Self> {
        let options = GenerationOptions::from_config(&config);
        let seed = config.seed;
        let model = LanguageModel::train(texts, config)?;
        Ok(Self::new(model, options, seed))
    }

    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn generate(&mut self, prompt: &str) -> Result<Generation> {
        self.model.generate(prompt, &self.options, &mut self.rng)
    }

    pub fn respond(&mut self, line: &str) -> Reply {
        let prompt = line.trim();
        if prompt.eq_ignore_ascii_case("exit") {
            return Reply::Quit;
        }
        if prompt.is_empty() {
            return Reply::Skip;
        }

        let required = self.model.context_size();
        if prompt.split_whitespace().count() < required {
            return Reply::TooShort { required };
        }

        match self.generate(prompt) {
            Ok(generation) => {
                info!(
                    tokens = generation.metrics.tokens_generated,
                    stop_reason = ?generation.stop_reason,
                    "prompt answered"
                );
                Reply::Output(generation.text)
            }
            Err(err) => Reply::Error(err.to_string()),
        }
    }
}

/// Reads prompts until `exit` or end of input, writing one reply per prompt.
pub fn run_chat_loop(
    session: &mut ChatSession,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<()> {
    loop {
        write!(output, "Prompt> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        match session.respond(&line) {
            Reply::Quit => break,
            Reply::Skip => continue,
            Reply::TooShort { required } => {
                writeln!(output, "Please enter at least {required} words.")?;
            }
            Reply::Output(text) => writeln!(output, "{text}")?,
            Reply::Error(message) => writeln!(output, "error: {message}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session() -> ChatSession {
        let config = ModelConfig {
            seed: Some(3),
            ..ModelConfig::tiny()
        };
        ChatSession::train(&["the cat sits on the mat", "the dog runs in the park"], config)
            .unwrap()
    }

    #[test]
    fn control_inputs() {
        let mut chat = session();
        assert_eq!(chat.respond("exit"), Reply::Quit);
        assert_eq!(chat.respond("  EXIT "), Reply::Quit);
        assert_eq!(chat.respond("   "), Reply::Skip);
        assert_eq!(chat.respond("cat"), Reply::TooShort { required: 2 });
    }

    #[test]
    fn answers_known_prompt() {
        let mut chat = session();
        match chat.respond("cat sits") {
            Reply::Output(text) => assert_eq!(text, "cat sits on the mat"),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn unknown_word_keeps_session_alive() {
        let mut chat = session();
        assert_eq!(
            chat.respond("purple elephants"),
            Reply::Error("unknown word: purple".to_string())
        );
        assert!(matches!(chat.respond("dog runs"), Reply::Output(_)));
    }

    #[test]
    fn options_come_from_config() {
        let chat = session();
        assert_eq!(chat.options().max_new_tokens, 4);
        assert_eq!(chat.model().context_size(), 2);
    }

    #[test]
    fn chat_loop_handles_each_reply() {
        let config = ModelConfig {
            seed: Some(1),
            ..ModelConfig::tiny()
        };
        let mut chat = ChatSession::train(&["a b c d"], config).unwrap();
        let mut input = Cursor::new("a\n\na b\nzzz yyy\nexit\na b\n");
        let mut output = Vec::new();

        run_chat_loop(&mut chat, &mut input, &mut output).unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Please enter at least 2 words."));
        assert!(transcript.contains("a b c d\n"));
        assert!(transcript.contains("error: unknown word: zzz"));
        assert_eq!(transcript.matches("a b c d").count(), 1);
    }

    #[test]
    fn chat_loop_stops_at_end_of_input() {
        let mut chat = ChatSession::train(&["a b c"], ModelConfig::tiny()).unwrap();
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        run_chat_loop(&mut chat, &mut input, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Prompt> \n");
    }
}
