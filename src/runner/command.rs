use std::fmt;
use std::path::PathBuf;

/// A program and its arguments. The program is either a bare name looked up on
/// `PATH` (e.g. `composer`) or a resolved path into `vendor/bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argument vector, program first
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_order() {
        let cmd = CommandLine::new("/app/vendor/bin/phpstan")
            .arg("analyse")
            .args(["src/", "--level", "max"]);

        assert_eq!(
            cmd.argv(),
            vec!["/app/vendor/bin/phpstan", "analyse", "src/", "--level", "max"]
        );
        assert_eq!(cmd.to_string(), "/app/vendor/bin/phpstan analyse src/ --level max");
    }
}
