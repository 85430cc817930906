use anyhow::{Context, Result};
use aws_config::Region;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable carrying the credentials payload
pub const CREDENTIALS_ENV: &str = "TRANSCRIBER_CREDENTIALS";

/// File name the credentials payload is materialized to inside the work directory
const CREDENTIALS_FILE_NAME: &str = "cloud-credentials.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cloud (AWS) configuration
    pub cloud: CloudConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// AWS region
    pub region: String,

    /// S3 bucket for temporary audio storage
    pub bucket: String,

    /// Optional S3 key prefix
    pub key_prefix: Option<String>,

    /// Credentials file (JSON); the default provider chain is used when absent
    pub credentials_file: Option<PathBuf>,

    /// Transcription job settings
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Language the job is primarily expected to be in
    pub primary_language: String,

    /// Other languages the service may identify, in order of preference
    pub alternative_languages: Vec<String>,

    /// Sample rate of the uploaded PCM audio
    pub sample_rate: u32,

    /// Upper bound for waiting on a job, in seconds
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for per-request artifacts
    pub work_dir: Option<PathBuf>,

    /// Address the HTTP server binds to
    pub host: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Directory holding the static front-end
    pub frontend_dir: PathBuf,

    /// Seconds cut from the start of downloaded audio
    pub trim_offset_secs: f64,

    /// Caption language used when a request does not name one
    pub default_lang: String,
}

/// Credentials payload accepted through [`CREDENTIALS_ENV`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cloud: CloudConfig {
                region: "us-east-1".to_string(),
                bucket: "video-transcriber-audio".to_string(),
                key_prefix: None,
                credentials_file: None,
                transcription: TranscriptionConfig {
                    primary_language: "es-US".to_string(),
                    alternative_languages: ["es-ES", "en-US", "en-GB", "pt-BR", "fr-FR"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    sample_rate: 16000,
                    max_wait_secs: 900,
                },
            },
            app: AppConfig {
                work_dir: None,
                host: "0.0.0.0".to_string(),
                port: 5000,
                frontend_dir: PathBuf::from("frontend"),
                trim_offset_secs: 18.0,
                default_lang: "es".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file (or defaults), then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str::<Config>(&content)
                .context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("video-transcriber").join("config.yaml"))
    }

    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bucket) = lookup("BUCKET_NAME").filter(|v| !v.is_empty()) {
            self.cloud.bucket = bucket;
        }
        if let Some(region) = lookup("AWS_REGION").filter(|v| !v.is_empty()) {
            self.cloud.region = region;
        }
        if let Some(dir) = lookup("TRANSCRIBER_WORK_DIR").filter(|v| !v.is_empty()) {
            self.app.work_dir = Some(PathBuf::from(dir));
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.cloud.bucket.is_empty() {
            anyhow::bail!("An S3 bucket must be configured");
        }

        let trim = self.app.trim_offset_secs;
        if trim.is_nan() || trim < 0.0 {
            anyhow::bail!("trim_offset_secs must be a non-negative number");
        }

        if self.cloud.transcription.max_wait_secs == 0 {
            anyhow::bail!("max_wait_secs must be greater than zero");
        }

        Ok(())
    }

    /// Directory where per-request artifacts are written
    pub fn work_dir(&self) -> PathBuf {
        self.app
            .work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("video-transcriber"))
    }

    /// Materialize the credentials payload from the environment, if one was supplied.
    ///
    /// The file is written once; an existing file is left untouched. On success the
    /// config points at it so the AWS clients pick it up.
    pub fn bootstrap_credentials(&mut self) -> Result<Option<PathBuf>> {
        let payload = match std::env::var(CREDENTIALS_ENV) {
            Ok(payload) if !payload.trim().is_empty() => payload,
            _ => return Ok(self.cloud.credentials_file.clone()),
        };

        let work_dir = self.work_dir();
        fs_err::create_dir_all(&work_dir)?;
        let path = work_dir.join(CREDENTIALS_FILE_NAME);

        write_credentials_once(&path, &payload)?;
        tracing::info!("Cloud credentials materialized at {}", path.display());

        self.cloud.credentials_file = Some(path.clone());
        Ok(Some(path))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  AWS Region: {}", self.cloud.region);
        println!("  S3 Bucket: {}", self.cloud.bucket);
        if let Some(prefix) = &self.cloud.key_prefix {
            println!("  S3 Prefix: {}", prefix);
        }
        println!("  Primary Language: {}", self.cloud.transcription.primary_language);
        println!(
            "  Alternative Languages: {}",
            self.cloud.transcription.alternative_languages.join(", ")
        );
        println!("  Max Wait: {}s", self.cloud.transcription.max_wait_secs);
        println!("  Trim Offset: {}s", self.app.trim_offset_secs);
        println!("  Work Dir: {}", self.work_dir().display());
        println!("  Listen: {}:{}", self.app.host, self.app.port);
    }

    /// Get AWS region
    pub fn aws_region(&self) -> Region {
        Region::new(self.cloud.region.clone())
    }

    /// Shared SDK configuration for the S3 and Transcribe clients.
    ///
    /// Credentials from `cloud.credentials_file` take precedence over the default chain.
    pub async fn aws_sdk_config(&self) -> Result<aws_types::SdkConfig> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(self.aws_region());

        if let Some(path) = &self.cloud.credentials_file {
            let creds = read_credentials(path)?;
            loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                creds.session_token,
                None,
                "video-transcriber",
            ));
        }

        Ok(loader.load().await)
    }
}

fn write_credentials_once(path: &Path, payload: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    serde_json::from_str::<CloudCredentials>(payload)
        .with_context(|| format!("{} is not a valid credentials payload", CREDENTIALS_ENV))?;

    let mut options = fs_err::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use fs_err::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(path) {
        Ok(file) => file,
        // Another process materialized it first
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(()),
        Err(e) => return Err(anyhow::Error::new(e).context("Failed to create credentials file")),
    };

    file.write_all(payload.as_bytes())
        .context("Failed to write credentials file")?;

    Ok(())
}

/// Read a credentials file written by [`Config::bootstrap_credentials`] or by hand
pub fn read_credentials(path: &Path) -> Result<CloudCredentials> {
    let content = fs_err::read_to_string(path).context("Failed to read credentials file")?;
    serde_json::from_str(&content).context("Failed to parse credentials file")
}
