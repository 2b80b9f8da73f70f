use clap::Parser;

use textgym_dataset::DEFAULT_OUTPUT_DIR;

#[derive(Debug, Parser)]
#[command(name = "textarena-dataset")]
#[command(about = "Write TextArena prompt datasets (train/validation Parquet splits).")]
pub(crate) struct Cli {
    /// Directory for train.parquet and validation.parquet (`~` is expanded).
    #[arg(long = "output_dir", default_value = DEFAULT_OUTPUT_DIR)]
    pub(crate) output_dir: String,

    /// Number of rows to generate, cycling through the supported games.
    #[arg(long = "num_examples", default_value_t = 100)]
    pub(crate) num_examples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["textarena-dataset"]).unwrap();
        assert_eq!(cli.output_dir, "~/data/textarena");
        assert_eq!(cli.num_examples, 100);
    }

    #[test]
    fn underscore_flags() {
        let cli = Cli::try_parse_from([
            "textarena-dataset",
            "--output_dir",
            "/tmp/ta",
            "--num_examples",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, "/tmp/ta");
        assert_eq!(cli.num_examples, 3);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["textarena-dataset", "--seed", "1"]).is_err());
    }
}
