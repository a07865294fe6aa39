use crate::utils::{Logger, Timer};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;

/// Upstream location of the full VADER lexicon
pub const DEFAULT_LEXICON_URL: &str =
    "https://raw.githubusercontent.com/cjhutto/vaderSentiment/master/vaderSentiment/vader_lexicon.txt";

const BUNDLED_LEXICON: &str = include_str!("../../data/vader_lexicon.txt");

static BUNDLED: OnceLock<Arc<Lexicon>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon: {0}")]
    Io(#[from] io::Error),

    #[error("failed to download lexicon: {0}")]
    Download(#[from] reqwest::Error),

    #[error("lexicon download from {url} returned HTTP {status}")]
    DownloadStatus { url: String, status: u16 },

    #[error("lexicon at {0} has no usable entries")]
    Empty(String),
}

/// Where the lexicon comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexiconSource {
    /// The copy compiled into the binary
    Bundled,
    /// A local file, downloaded from `url` the first time it is missing
    File { path: PathBuf, url: String },
}

/// Word to valence table in the VADER `token<TAB>mean<TAB>...` format
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
}

impl Lexicon {
    /// Parse lexicon text, skipping blank, comment and malformed lines
    pub fn parse(content: &str) -> Self {
        let valences = content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let token = fields.next()?.trim();
                let valence = fields.next()?.trim().parse::<f64>().ok()?;
                if token.is_empty() {
                    return None;
                }
                Some((token.to_string(), valence))
            })
            .collect();

        Self { valences }
    }

    /// Process-wide handle to the bundled lexicon, parsed on first use
    pub fn bundled() -> Arc<Lexicon> {
        BUNDLED
            .get_or_init(|| Arc::new(Lexicon::parse(BUNDLED_LEXICON)))
            .clone()
    }

    pub fn from_file(path: &Path) -> Result<Self, LexiconError> {
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::parse(&content);
        if lexicon.is_empty() {
            return Err(LexiconError::Empty(path.display().to_string()));
        }
        Ok(lexicon)
    }

    /// Load the lexicon once for the caller to share
    pub async fn load(source: &LexiconSource) -> Result<Arc<Lexicon>, LexiconError> {
        match source {
            LexiconSource::Bundled => Ok(Self::bundled()),
            LexiconSource::File { path, url } => {
                ensure_local_copy(path, url).await?;
                let timer = Timer::start("lexicon parse");
                let lexicon = Self::from_file(path)?;
                timer.log_elapsed("LEXICON");
                Logger::new("LEXICON").info(&format!(
                    "Loaded {} entries from {}",
                    lexicon.len(),
                    path.display()
                ));
                Ok(Arc::new(lexicon))
            }
        }
    }

    pub fn valence(&self, token: &str) -> Option<f64> {
        self.valences.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.valences.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

/// Download the lexicon to `path` unless a copy is already there.
///
/// Returns whether a download happened.
pub async fn ensure_local_copy(path: &Path, url: &str) -> Result<bool, LexiconError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }

    let logger = Logger::new("LEXICON");
    logger.info(&format!("Downloading lexicon from {} to {}", url, path.display()));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LexiconError::DownloadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let content = response.text().await?;
    if Lexicon::parse(&content).is_empty() {
        return Err(LexiconError::Empty(url.to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vader_format() {
        let lexicon = Lexicon::parse(
            "good\t1.9\t0.9434\t[2, 1, 2]\n# comment\n\nbroken line\nbad\t-2.5\t0.67\n:)\t2.0\t1.1\n",
        );
        assert_eq!(lexicon.len(), 3);
        assert_eq!(lexicon.valence("good"), Some(1.9));
        assert_eq!(lexicon.valence("bad"), Some(-2.5));
        assert!(lexicon.contains(":)"));
        assert_eq!(lexicon.valence("meeting"), None);
    }

    #[test]
    fn test_bundled_lexicon_is_shared() {
        let first = Lexicon::bundled();
        let second = Lexicon::bundled();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.len() > 300);
        assert!(first.valence("love").unwrap() > 0.0);
        assert!(first.valence("worst").unwrap() < 0.0);
    }

    #[tokio::test]
    async fn test_existing_file_is_not_fetched_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vader_lexicon.txt");
        std::fs::write(&path, "great\t3.1\t0.5\n").unwrap();

        // The URL is unreachable, so a download attempt would fail
        let downloaded = ensure_local_copy(&path, "http://127.0.0.1:9/lexicon.txt")
            .await
            .unwrap();
        assert!(!downloaded);

        let source = LexiconSource::File {
            path: path.clone(),
            url: "http://127.0.0.1:9/lexicon.txt".to_string(),
        };
        let lexicon = Lexicon::load(&source).await.unwrap();
        assert_eq!(lexicon.valence("great"), Some(3.1));
    }

    #[tokio::test]
    async fn test_missing_file_with_unreachable_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let result = ensure_local_copy(&path, "http://127.0.0.1:9/lexicon.txt").await;
        assert!(matches!(result, Err(LexiconError::Download(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "\n\n").unwrap();
        assert!(matches!(Lexicon::from_file(&path), Err(LexiconError::Empty(_))));
    }
}
