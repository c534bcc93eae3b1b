use std::{env, path::PathBuf};

use getopts::Options;
use tracing::warn;

use crate::config::CONFIG_FILE;

#[derive(Clone, Debug, Default)]
pub struct Args {
    pub cfg_file: PathBuf,
    // test helper
    pub cfg_str: Option<String>,
}

pub fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options] [config_file]", program);
    print!("{}", opts.usage(&brief));
}

pub fn get_args() -> Args {
    let args: Vec<String> = env::args().collect();
    parse_args(&args)
}

pub fn parse_args(args: &[String]) -> Args {
    let program = args.first().cloned().unwrap_or_else(|| "sprout".to_owned());
    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");

    let default_args = Args { cfg_file: default_cfg_file(), cfg_str: None };
    let matches = match opts.parse(args.iter().skip(1)) {
        Ok(m) => m,
        Err(f) => {
            warn!("Error parsing arguments: {}", f);
            warn!("Proceeding with defaults.");
            print_usage(&program, opts);
            return default_args;
        }
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        std::process::exit(0);
    }

    let Some(config_file_path) = matches.free.first() else {
        return default_args;
    };
    let path = PathBuf::from(config_file_path);

    // Attempt to load the config file, but proceed with default if it fails
    if !path.exists() {
        warn!(file = %config_file_path, "Config file does not exist. Proceeding with defaults.");
        return default_args;
    }

    Args { cfg_file: path, cfg_str: None }
}

pub fn default_cfg_file() -> PathBuf {
    env::current_dir().map(|dir| dir.join(CONFIG_FILE)).unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::{default_cfg_file, parse_args};

    #[test]
    fn no_arguments_use_default_file() {
        let args = parse_args(&["sprout".to_owned()]);
        assert_eq!(args.cfg_file, default_cfg_file());
        assert!(args.cfg_str.is_none());
    }

    #[test]
    fn missing_file_argument_falls_back() {
        let args = parse_args(&["sprout".to_owned(), "/no/such/file.toml".to_owned()]);
        assert_eq!(args.cfg_file, default_cfg_file());
    }

    #[test]
    fn existing_file_argument_is_used() {
        let path = std::env::temp_dir().join("sprout_run_options_test.toml");
        std::fs::write(&path, "").unwrap();
        let args = parse_args(&["sprout".to_owned(), path.to_string_lossy().into_owned()]);
        assert_eq!(args.cfg_file, path);
        let _ = std::fs::remove_file(path);
    }
}
