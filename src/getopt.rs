//! Re-entrant short-option parser
//!
//! GNU-like semantics over an argument vector: single-letter options,
//! clustered letters, a trailing `:` in the spec marking a required
//! argument (attached or in the next element), and `--` to end option
//! processing. State lives in a caller-owned struct, so the parser
//! holds no process-wide state and any number of scans can run
//! independently.

/// One step of option scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptToken {
    /// A recognised option letter, with its argument when the spec
    /// requires one.
    Opt(char, Option<String>),
    /// Options are exhausted: `--`, a non-option word, or the end of
    /// the vector.
    End,
    /// An unknown letter or a missing required argument.
    Error(char),
}

/// Caller-owned scanning state. `index` is the position of the first
/// unscanned element once `End` is returned.
#[derive(Debug, Clone, Default)]
pub struct GetOpt {
    /// Next element of the vector to examine.
    pub index: usize,
    place: String,
    init: bool,
}

impl GetOpt {
    pub fn new() -> Self {
        GetOpt::default()
    }

    /// Scan the next option from `argv` against `spec`. Element 0 is
    /// the program or command name and is skipped.
    pub fn next(&mut self, argv: &[String], spec: &str) -> OptToken {
        if !self.init {
            self.init = true;
            self.index = 1;
            self.place.clear();
        }
        if self.place.is_empty() {
            let arg = match argv.get(self.index) {
                Some(a) => a.as_str(),
                None => return OptToken::End,
            };
            if !arg.starts_with('-') || arg.len() == 1 {
                return OptToken::End;
            }
            if arg.as_bytes()[1] == b'-' {
                // `--` consumes itself and ends option processing.
                self.index += 1;
                return OptToken::End;
            }
            self.place = arg[1..].to_string();
        }
        let option = self.place.remove(0);
        let spec_pos = if option == ':' { None } else { spec.find(option) };
        let takes_arg = match spec_pos {
            Some(p) => spec[p + option.len_utf8()..].starts_with(':'),
            None => {
                if self.place.is_empty() {
                    self.index += 1;
                }
                return OptToken::Error(option);
            }
        };
        if !takes_arg {
            if self.place.is_empty() {
                self.index += 1;
            }
            return OptToken::Opt(option, None);
        }
        let arg = if !self.place.is_empty() {
            std::mem::take(&mut self.place)
        } else {
            self.index += 1;
            match argv.get(self.index) {
                Some(a) => a.clone(),
                None => return OptToken::Error(option),
            }
        };
        self.place.clear();
        self.index += 1;
        OptToken::Opt(option, Some(arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags_and_argument() {
        let argv = args(&["./program", "-h", "-f", "argument-to-f", "-c", "file"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "hf:c"), OptToken::Opt('h', None));
        assert_eq!(
            opt.next(&argv, "hf:c"),
            OptToken::Opt('f', Some("argument-to-f".to_string()))
        );
        assert_eq!(opt.next(&argv, "hf:c"), OptToken::Opt('c', None));
        assert_eq!(opt.next(&argv, "hf:c"), OptToken::End);
        assert_eq!(argv[opt.index], "file");
    }

    #[test]
    fn test_attached_argument() {
        let argv = args(&["cmd", "-fvalue", "rest"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "f:"), OptToken::Opt('f', Some("value".to_string())));
        assert_eq!(opt.next(&argv, "f:"), OptToken::End);
        assert_eq!(opt.index, 2);
    }

    #[test]
    fn test_clustered_flags() {
        let argv = args(&["cmd", "-abc"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "abc"), OptToken::Opt('a', None));
        assert_eq!(opt.next(&argv, "abc"), OptToken::Opt('b', None));
        assert_eq!(opt.next(&argv, "abc"), OptToken::Opt('c', None));
        assert_eq!(opt.next(&argv, "abc"), OptToken::End);
    }

    #[test]
    fn test_double_dash_ends_options() {
        let argv = args(&["cmd", "--", "-a"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "a"), OptToken::End);
        assert_eq!(argv[opt.index], "-a");
    }

    #[test]
    fn test_unknown_option() {
        let argv = args(&["cmd", "-z"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "ab"), OptToken::Error('z'));
    }

    #[test]
    fn test_missing_required_argument() {
        let argv = args(&["cmd", "-f"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "f:"), OptToken::Error('f'));
    }

    #[test]
    fn test_non_option_stops_scanning() {
        let argv = args(&["cmd", "word", "-a"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "a"), OptToken::End);
        assert_eq!(opt.index, 1);
    }

    #[test]
    fn test_no_arguments_at_all() {
        let argv = args(&["cmd"]);
        let mut opt = GetOpt::new();
        assert_eq!(opt.next(&argv, "a"), OptToken::End);
    }

    #[test]
    fn test_two_scans_are_independent() {
        let argv = args(&["cmd", "-a"]);
        let mut one = GetOpt::new();
        let mut two = GetOpt::new();
        assert_eq!(one.next(&argv, "a"), OptToken::Opt('a', None));
        assert_eq!(two.next(&argv, "a"), OptToken::Opt('a', None));
    }
}
