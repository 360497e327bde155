use std::{
    collections::HashMap,
    fs,
    io::{self, ErrorKind},
    path::PathBuf,
};

use blanks_core::intents::LoginStore;

const LOGIN_KEY: &str = "loginId";

/// A small JSON key-value file.
pub struct FileLoginStore {
    path: PathBuf,
}

impl FileLoginStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLoginStore { path: path.into() }
    }

    fn read(&self) -> io::Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| io::Error::new(ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e),
        }
    }
}

impl LoginStore for FileLoginStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.read()?.remove(LOGIN_KEY))
    }

    fn save(&mut self, id: &str) -> io::Result<()> {
        let mut values = self.read()?;
        values.insert(LOGIN_KEY.to_string(), id.to_string());
        let text = serde_json::to_string_pretty(&values).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
