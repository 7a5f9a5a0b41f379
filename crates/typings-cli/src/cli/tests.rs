#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_bundle_args() {
        let cli = Cli::try_parse_from(["typings", "bundle", "--out", "out", "--name", "root", "-A", "--no-meta"])
            .unwrap();

        match cli.command {
            Command::Bundle(args) => {
                assert_eq!(args.out, PathBuf::from("out"));
                assert_eq!(args.name.as_deref(), Some("root"));
                assert!(args.ambient);
                assert!(args.no_meta);
                assert!(!args.strict);
                assert!(args.index.is_none());
                assert!(args.cwd.is_none());
            }
            other => panic!("expected bundle, got {other:?}"),
        }
    }

    #[test]
    fn test_bundle_index() {
        let cli = Cli::try_parse_from(["typings", "bundle", "-o", "out", "--index", "typings/index.d.ts"]).unwrap();

        let Command::Bundle(args) = cli.command else {
            panic!("expected bundle");
        };
        assert_eq!(args.index, Some(PathBuf::from("typings/index.d.ts")));
    }

    #[test]
    fn test_bundle_requires_out() {
        assert!(Cli::try_parse_from(["typings", "bundle"]).is_err());
    }

    #[test]
    fn test_list_args() {
        let cli = Cli::try_parse_from(["typings", "list", "--dev", "--ambient", "--cwd", "/p"]).unwrap();

        match cli.command {
            Command::List(args) => {
                assert!(args.dev);
                assert!(args.ambient);
                assert!(!args.json);
                assert_eq!(args.cwd, Some(PathBuf::from("/p")));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["typings", "parse", "npm:foo", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);

        assert!(Cli::try_parse_from(["typings", "-v", "-q", "parse", "npm:foo"]).is_err());
    }
}
