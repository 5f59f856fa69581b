use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "wordquiz", "WordQuiz") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn default_store_file() -> (PathBuf, PathBuf) {
    let root = data_root();
    let file = root.join("wordquiz.json");
    let backups = root.join("backups");
    (file, backups)
}

pub fn store_file_in(root: &std::path::Path) -> (PathBuf, PathBuf) {
    (root.join("wordquiz.json"), root.join("backups"))
}

pub fn settings_file_in(root: &std::path::Path) -> PathBuf {
    root.join("settings.json")
}
