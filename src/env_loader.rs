use std::env;
use std::path::PathBuf;

use crate::digest::paths::docsum_home;

fn fallback_dotenv_path(docsum_home_var: Option<String>) -> Option<PathBuf> {
    Some(docsum_home(docsum_home_var)?.join(".env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let Some(path) = fallback_dotenv_path(env::var("DOCSUM_HOME").ok()) else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_dotenv_path;
    use std::path::PathBuf;

    #[test]
    fn fallback_uses_docsum_home_when_set() {
        let got = fallback_dotenv_path(Some("/workspace/docsum".to_string()));
        let want = Some(PathBuf::from("/workspace/docsum/.env"));
        assert_eq!(got, want);
    }

    #[test]
    fn fallback_lands_in_dot_docsum_without_override() {
        if let Some(got) = fallback_dotenv_path(None) {
            assert!(got.ends_with(".docsum/.env"));
        }
    }
}
