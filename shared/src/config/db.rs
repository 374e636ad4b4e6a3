//! MySQL Database Configuration
//!
//! 연결 대상 이름(예: "localhost")으로 연결 문자열을 찾아 주는 설정 계층입니다.
//! `.env` 파일, `appsettings.{profile}.json`, 환경변수 순서로 값을 모읍니다.

use crate::tool::error::AppError;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// 연결 대상 이름 → 연결 문자열
pub trait ConnectionStringProvider: Send + Sync {
    fn connection_string(&self, name: &str) -> Option<String>;
}

impl ConnectionStringProvider for HashMap<String, String> {
    fn connection_string(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// `appsettings.{profile}.json` 형식
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(rename = "ConnectionStrings", default)]
    connection_strings: HashMap<String, String>,
}

/// 애플리케이션 설정
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub profile: String,
    connection_strings: HashMap<String, String>,
}

impl AppSettings {
    /// 현재 디렉토리 기준으로 설정을 읽습니다.
    pub fn load(profile: &str) -> Result<Self, AppError> {
        load_env_file();
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from_dir(&current_dir, profile)
    }

    /// `dir`의 `appsettings.{profile}.json`을 읽고 환경변수로 덮어씁니다.
    ///
    /// 파일이 없으면 환경변수만 사용합니다. 파일이 있는데 JSON이 잘못되었으면 에러입니다.
    pub fn load_from_dir(dir: &Path, profile: &str) -> Result<Self, AppError> {
        let path = dir.join(format!("appsettings.{profile}.json"));
        let mut connection_strings = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Configuration(format!("cannot read {}: {e}", path.display()))
            })?;
            let file: SettingsFile = serde_json::from_str(&content).map_err(|e| {
                AppError::Configuration(format!("invalid {}: {e}", path.display()))
            })?;
            info!("설정 파일 로드: {:?}", path);
            file.connection_strings
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect()
        } else {
            debug!("설정 파일이 없어 환경변수만 사용합니다: {:?}", path);
            HashMap::new()
        };

        merge_env_sources(&mut connection_strings, env::vars());

        Ok(Self {
            profile: profile.to_string(),
            connection_strings,
        })
    }

    pub fn with_connection_string(mut self, name: &str, url: &str) -> Self {
        self.connection_strings
            .insert(name.to_lowercase(), url.to_string());
        self
    }
}

impl ConnectionStringProvider for AppSettings {
    /// 이름은 대소문자를 구분하지 않습니다. 등록되지 않은 이름은 `None`.
    fn connection_string(&self, name: &str) -> Option<String> {
        self.connection_strings.get(&name.to_lowercase()).cloned()
    }
}

/// .env 파일 로드 - 현재 디렉토리, 상위 디렉토리, 기본 탐색 순
pub fn load_env_file() {
    let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let workspace_env = current_dir.join(".env");
    let parent_env = current_dir.parent().map(|p| p.join(".env"));

    if workspace_env.exists() {
        dotenv::from_path(&workspace_env).ok();
        info!("환경 파일 로드: {:?}", workspace_env);
        return;
    }
    // 서브패키지에서 실행되는 경우
    if let Some(parent_env) = parent_env.filter(|p| p.exists()) {
        dotenv::from_path(&parent_env).ok();
        info!("환경 파일 로드: {:?}", parent_env);
        return;
    }
    if dotenv::dotenv().is_err() {
        debug!(".env 파일을 찾을 수 없어서 환경 변수를 직접 사용합니다.");
    }
}

/// 개별 환경변수(db_host 등)로 조립한 URL이 들어가는 유일한 대상
pub const ENV_COMPOSED_TARGET: &str = "localhost";

/// 환경변수를 연결 문자열 맵에 반영합니다.
///
/// `DB_URL_<TARGET>`은 해당 대상을 덮어씁니다. `db_host`가 있으면
/// `ENV_COMPOSED_TARGET` 항목이 비어 있을 때만 그 대상에 조립한 URL을 넣습니다.
fn merge_env_sources<I>(connection_strings: &mut HashMap<String, String>, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut db_vars = HashMap::new();
    for (key, value) in vars {
        if let Some(target) = key.strip_prefix("DB_URL_") {
            connection_strings.insert(target.to_lowercase(), value);
        } else if key.starts_with("db_") {
            db_vars.insert(key, value);
        }
    }

    if connection_strings.contains_key(ENV_COMPOSED_TARGET) {
        return;
    }
    if let Some(url) = compose_url(|name| db_vars.get(name).cloned()) {
        connection_strings.insert(ENV_COMPOSED_TARGET.to_string(), url);
    }
}

/// db_host / db_port / db_id / db_password / db_name 으로 URL 조립
///
/// 사용자 이름과 비밀번호는 퍼센트 인코딩됩니다.
fn compose_url<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("db_host")?;
    let port = match lookup("db_port") {
        Some(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!("잘못된 db_port '{}', 조립하지 않습니다.", raw);
                return None;
            }
        },
        None => 3306,
    };
    let user = lookup("db_id").unwrap_or_else(|| {
        warn!("db_id 환경변수가 없어서 root를 사용합니다.");
        "root".to_string()
    });
    let password = lookup("db_password").unwrap_or_default();
    let database = lookup("db_name").unwrap_or_else(|| {
        warn!("db_name 환경변수가 없어서 warehub를 사용합니다.");
        "warehub".to_string()
    });

    let mut url = match Url::parse(&format!("mysql://{host}")) {
        Ok(url) if url.host_str().is_some() => url,
        _ => {
            warn!("잘못된 db_host '{}', 조립하지 않습니다.", host);
            return None;
        }
    };
    let applied = url.set_port(Some(port)).is_ok()
        && url.set_username(&user).is_ok()
        && (password.is_empty() || url.set_password(Some(&password)).is_ok());
    if !applied {
        warn!("연결 정보를 URL에 넣을 수 없습니다: {}", host);
        return None;
    }
    url.set_path(&database);

    info!("데이터베이스 연결 정보 조립: {}:{}@{}/{}", user, "***", host, database);
    Some(url.to_string())
}
