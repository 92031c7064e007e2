//! Turns output records into terminal text.
//!
//! Each call renders exactly one execution's records; nothing from earlier
//! executions is kept or repeated.

use std::io::{self, Write};

use lineterm_core::{Effect, OutputRecord};

use crate::error::CliError;
use crate::url::validate_link;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// One JSON array per execution instead of text.
    pub json: bool,
    /// Print `$ <line>` for header records (off when the user just typed it).
    pub echo_headers: bool,
    /// Hosts links may open; empty allows any.
    pub allowed_domains: Vec<String>,
}

pub struct Renderer<W: Write, E: Write> {
    out: W,
    err: E,
    options: RenderOptions,
}

impl<W: Write, E: Write> Renderer<W, E> {
    pub fn new(out: W, err: E, options: RenderOptions) -> Self {
        Self { out, err, options }
    }

    pub fn render(&mut self, outputs: &[OutputRecord]) -> Result<(), CliError> {
        if self.options.json {
            writeln!(self.out, "{}", serde_json::to_string(outputs)?)?;
            return Ok(self.out.flush()?);
        }

        for record in outputs {
            match record {
                OutputRecord::Header { command } => {
                    if self.options.echo_headers {
                        writeln!(self.out, "$ {}", command)?;
                    }
                }
                OutputRecord::Text(text) => writeln!(self.out, "{}", text)?,
                OutputRecord::Error(message) => writeln!(self.err, "{}", message)?,
                OutputRecord::Effect(effect) => self.apply(effect)?,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Print a bare line, e.g. a recalled history entry.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()
    }

    fn apply(&mut self, effect: &Effect) -> io::Result<()> {
        match effect {
            Effect::ClearScreen => write!(self.out, "{}", CLEAR_SCREEN),
            Effect::Navigate { url } => match validate_link(url, &self.options.allowed_domains) {
                Ok(url) => {
                    log::info!("render: navigate to {}", url);
                    writeln!(self.out, "Opening {}", url)
                }
                Err(err) => {
                    log::warn!("render: refused link {}: {}", url, err);
                    writeln!(self.err, "cannot open {}: {}", url, err)
                }
            },
        }
    }
}

#[cfg(test)]
impl Renderer<Vec<u8>, Vec<u8>> {
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.out, self.err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(options: RenderOptions, outputs: &[OutputRecord]) -> (String, String) {
        let mut renderer = Renderer::new(Vec::new(), Vec::new(), options);
        renderer.render(outputs).unwrap();
        let (out, err) = renderer.into_parts();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_text_and_errors() {
        let (out, err) = render(
            RenderOptions::default(),
            &[
                OutputRecord::header("cat a b"),
                OutputRecord::text("hello\nworld"),
                OutputRecord::error("cat: b: No such file or directory"),
            ],
        );
        assert_eq!(out, "hello\nworld\n");
        assert_eq!(err, "cat: b: No such file or directory\n");
    }

    #[test]
    fn test_echo_headers() {
        let options = RenderOptions {
            echo_headers: true,
            ..RenderOptions::default()
        };
        let (out, _) = render(options, &[OutputRecord::header("pwd"), OutputRecord::text("/")]);
        assert_eq!(out, "$ pwd\n/\n");
    }

    #[test]
    fn test_json() {
        let options = RenderOptions {
            json: true,
            ..RenderOptions::default()
        };
        let (out, _) = render(options, &[OutputRecord::text("hi")]);
        assert_eq!(out, "[{\"type\":\"text\",\"content\":\"hi\"}]\n");
    }

    #[test]
    fn test_effects() {
        let (out, _) = render(RenderOptions::default(), &[OutputRecord::clear_screen()]);
        assert_eq!(out, CLEAR_SCREEN);

        let (out, _) = render(
            RenderOptions::default(),
            &[OutputRecord::navigate("https://example.com")],
        );
        assert_eq!(out, "Opening https://example.com\n");
    }

    #[test]
    fn test_refused_link() {
        let options = RenderOptions {
            allowed_domains: vec!["google.com".to_string()],
            ..RenderOptions::default()
        };
        let (out, err) = render(options, &[OutputRecord::navigate("https://example.com")]);
        assert!(out.is_empty());
        assert_eq!(
            err,
            "cannot open https://example.com: domain 'example.com' is not allowed\n"
        );
    }
}
