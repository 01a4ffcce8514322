use crate::trace::TraceSink;

/// Character supply for the lexer with arbitrary lookahead.
///
/// The whole input is loaded up front. Tabs never reach the lexer and a
/// `\r\n` pair comes out as a single `\n`.
pub struct CharSource {
    chars: Vec<char>,
    position: usize,
    echo: Option<Box<dyn TraceSink>>,
}

impl CharSource {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            echo: None,
        }
    }

    /// Forward every consumed character to `sink`.
    pub fn with_echo(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.echo = Some(sink);
        self
    }

    pub fn next_char(&mut self) -> Option<char> {
        loop {
            let c = *self.chars.get(self.position)?;
            self.position += 1;
            self.echo(c);

            match c {
                '\t' => continue,
                '\r' if self.peek(0) == Some('\n') => {
                    self.position += 1;
                    self.echo('\n');
                    return Some('\n');
                }
                _ => return Some(c),
            }
        }
    }

    /// Character `offset` places past the next unconsumed one, raw.
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn echo(&mut self, c: char) {
        if let Some(sink) = self.echo.as_mut() {
            let mut buf = [0; 4];
            sink.emit(c.encode_utf8(&mut buf), "", false);
        }
    }
}
