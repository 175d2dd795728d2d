//! The settings schema
//!
//! Every recognized key is a variant of [`Key`]. [`declare`] maps each key to
//! its property declaration (default, kind, chains, policy flag); the match is
//! exhaustive, so adding a key without declaring it does not compile. The
//! `schema!` macro also generates one typed accessor per key on
//! [`Settings`].
//!
//! Private keys keep their leading underscore in [`Key::as_str`] (the name
//! used by `update` and snapshots) while their accessor drops it, e.g.
//! `_start_datetime` is read with [`Settings::start_datetime`].

use crate::config::validators::{
    any_kind, one_of, project_name, rfc3339, str_as_bool, to_int, to_string, trim_trailing_slash,
};
use crate::config::{Property, PropertyBuilder, ValueKind};
use crate::error::Error;
use crate::settings::Settings;

use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default public endpoint of the tracking service
pub const DEFAULT_BASE_URL: &str = "https://api.wandb.ai";

macro_rules! schema {
    ($( $variant:ident => $name:literal, $accessor:ident: $ty:ty; )*) => {
        /// A recognized settings key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Key {
            $( $variant, )*
        }

        impl Key {
            /// Every key, in declaration order
            pub const ALL: &'static [Key] = &[ $( Key::$variant, )* ];

            /// Name of the key as used by `update` and snapshots
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Key::$variant => $name, )*
                }
            }
        }

        impl Settings {
            $(
                #[doc = concat!("Resolved value of `", $name, "`, `None` when unset")]
                #[must_use]
                pub fn $accessor(&self) -> Option<$ty> {
                    self.get_as(Key::$variant)
                }
            )*
        }
    };
}

schema! {
    Mode => "mode", mode: String;
    StartMethod => "start_method", start_method: String;
    DebugLog => "_debug_log", debug_log: String;
    RequireService => "_require_service", require_service: String;
    ServiceTransport => "_service_transport", service_transport: String;
    Console => "console", console: String;
    Disabled => "disabled", disabled: bool;
    Force => "force", force: bool;
    RunTags => "run_tags", run_tags: Vec<String>;
    RunId => "run_id", run_id: String;
    SweepId => "sweep_id", sweep_id: String;
    Launch => "launch", launch: bool;
    LaunchConfigPath => "launch_config_path", launch_config_path: String;
    RootDir => "root_dir", root_dir: String;
    Silent => "silent", silent: bool;
    Quiet => "quiet", quiet: bool;
    ShowInfo => "show_info", show_info: bool;
    ShowWarnings => "show_warnings", show_warnings: bool;
    ShowErrors => "show_errors", show_errors: bool;
    Username => "username", username: String;
    Email => "email", email: String;
    SaveCode => "save_code", save_code: bool;
    DisableCode => "disable_code", disable_code: bool;
    DisableGit => "disable_git", disable_git: bool;
    GitRemote => "git_remote", git_remote: String;
    CodeDir => "code_dir", code_dir: String;
    ProgramRelpath => "program_relpath", program_relpath: String;
    Program => "program", program: String;
    NotebookName => "notebook_name", notebook_name: String;
    Host => "host", host: String;
    Resume => "resume", resume: String;
    Strict => "strict", strict: bool;
    LabelDisable => "label_disable", label_disable: bool;
    Entity => "entity", entity: String;
    Project => "project", project: String;
    RunGroup => "run_group", run_group: String;
    RunName => "run_name", run_name: String;
    RunJobType => "run_job_type", run_job_type: String;
    RunNotes => "run_notes", run_notes: String;
    SagemakerDisable => "sagemaker_disable", sagemaker_disable: bool;
    StartTime => "_start_time", start_time: f64;
    StartDatetime => "_start_datetime", start_datetime: String;
    UnsavedKeys => "_unsaved_keys", unsaved_keys: Vec<String>;
    ExceptExit => "_except_exit", except_exit: bool;
    RunqueueItemId => "_runqueue_item_id", runqueue_item_id: String;
    BaseUrl => "base_url", base_url: String;
    ApiKey => "api_key", api_key: String;
    Anonymous => "anonymous", anonymous: String;
    SummaryWarnings => "summary_warnings", summary_warnings: i64;
    IgnoreGlobs => "ignore_globs", ignore_globs: Vec<String>;
    Magic => "magic", magic: Value;
    AllowValChange => "allow_val_change", allow_val_change: bool;
    Relogin => "relogin", relogin: bool;
    LoginTimeout => "login_timeout", login_timeout: f64;
    Problem => "problem", problem: String;
    SystemSampleSeconds => "system_sample_seconds", system_sample_seconds: i64;
    SystemSample => "system_sample", system_sample: i64;
    HeartbeatSeconds => "heartbeat_seconds", heartbeat_seconds: i64;
    ConfigPaths => "config_paths", config_paths: Vec<String>;
    SweepParamPath => "sweep_param_path", sweep_param_path: String;
    ConfigDict => "_config_dict", config_dict: Value;
    SettingsSystemSpec => "settings_system_spec", settings_system_spec: String;
    SettingsWorkspaceSpec => "settings_workspace_spec", settings_workspace_spec: String;
    SyncDirSpec => "sync_dir_spec", sync_dir_spec: String;
    SyncFileSpec => "sync_file_spec", sync_file_spec: String;
    SyncSymlinkLatestSpec => "sync_symlink_latest_spec", sync_symlink_latest_spec: String;
    LogDirSpec => "log_dir_spec", log_dir_spec: String;
    LogUserSpec => "log_user_spec", log_user_spec: String;
    LogInternalSpec => "log_internal_spec", log_internal_spec: String;
    LogSymlinkUserSpec => "log_symlink_user_spec", log_symlink_user_spec: String;
    LogSymlinkInternalSpec => "log_symlink_internal_spec", log_symlink_internal_spec: String;
    ResumeFnameSpec => "resume_fname_spec", resume_fname_spec: String;
    FilesDirSpec => "files_dir_spec", files_dir_spec: String;
    TmpDirSpec => "tmp_dir_spec", tmp_dir_spec: String;
    Symlink => "symlink", symlink: bool;
    Docker => "docker", docker: String;
    CliOnlyMode => "_cli_only_mode", cli_only_mode: bool;
    DisableViewer => "_disable_viewer", disable_viewer: bool;
    Reinit => "reinit", reinit: bool;
    SaveRequirements => "_save_requirements", save_requirements: bool;
    ShowColors => "show_colors", show_colors: bool;
    ShowEmoji => "show_emoji", show_emoji: bool;
    SummaryErrors => "summary_errors", summary_errors: i64;
    InternalQueueTimeout => "_internal_queue_timeout", internal_queue_timeout: f64;
    InternalCheckProcess => "_internal_check_process", internal_check_process: f64;
    DisableMeta => "_disable_meta", disable_meta: bool;
    DisableStats => "_disable_stats", disable_stats: bool;
    JupyterPath => "_jupyter_path", jupyter_path: String;
    JupyterName => "_jupyter_name", jupyter_name: String;
    JupyterRoot => "_jupyter_root", jupyter_root: String;
    Executable => "_executable", executable: String;
    Cuda => "_cuda", cuda: bool;
    Args => "_args", args: Vec<Value>;
    Os => "_os", os: String;
    Python => "_python", python: String;
    Kaggle => "_kaggle", kaggle: String;
    LolId => "lol_id", lol_id: String;
    MeaningOfLife => "meaning_of_life", meaning_of_life: i64;
}

impl Key {
    /// Position of the key in [`Key::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Private keys start with an underscore
    #[must_use]
    pub fn is_private(self) -> bool {
        self.as_str().starts_with('_')
    }

    /// Kind of value the key holds
    #[must_use]
    pub fn kind(self) -> ValueKind {
        declare(self).kind()
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::UnexpectedArguments(vec![s.to_string()]))
    }
}

// =============================================================================
// Declarations
// =============================================================================

type Decl = PropertyBuilder<Settings>;

fn string(key: Key) -> Decl {
    Property::string(key.as_str())
}

fn flag(key: Key) -> Decl {
    Property::boolean(key.as_str()).preprocessor(str_as_bool())
}

fn integer(key: Key) -> Decl {
    Property::integer(key.as_str())
}

fn number(key: Key) -> Decl {
    Property::number(key.as_str())
}

fn string_list(key: Key) -> Decl {
    Property::string_list(key.as_str())
}

/// Property declaration for a key, before any override is applied
pub(crate) fn declare(key: Key) -> Decl {
    match key {
        Key::Mode => string(key)
            .default("online")
            .validator(one_of(&["dryrun", "run", "offline", "online", "disabled"])),
        Key::StartMethod => {
            string(key).validator(one_of(&["thread", "fork", "spawn", "forkserver"]))
        }
        Key::Console => string(key)
            .default("auto")
            .validator(one_of(&["auto", "redirect", "off", "wrap"])),
        Key::Disabled => flag(key)
            .default(false)
            .help("Alias for mode=dryrun, not supported yet"),
        Key::Silent => flag(key).default(false),
        Key::ShowInfo | Key::ShowWarnings | Key::ShowErrors => flag(key).default(true),
        Key::GitRemote => string(key).default("origin"),
        Key::Project => string(key).validator(project_name()),
        Key::StartTime | Key::LoginTimeout => number(key),
        Key::StartDatetime => string(key).validator(rfc3339()),
        Key::UnsavedKeys | Key::ConfigPaths | Key::RunTags => string_list(key),
        Key::BaseUrl => string(key)
            .default(DEFAULT_BASE_URL)
            .preprocessor(trim_trailing_slash())
            .help("The base url for the wandb api."),
        Key::Anonymous => {
            string(key).validator(one_of(&["allow", "must", "never", "false", "true"]))
        }
        Key::SummaryWarnings => integer(key).default(5).preprocessor(to_int()).policy(),
        Key::IgnoreGlobs => string_list(key).default(Value::Array(Vec::new())),
        Key::Magic => Property::builder(key.as_str()).validator(any_kind(&[
            ValueKind::String,
            ValueKind::Bool,
            ValueKind::Object,
        ])),
        Key::Problem => string(key)
            .default("fatal")
            .validator(one_of(&["fatal", "warn", "silent"])),
        Key::SystemSampleSeconds => integer(key).default(2),
        Key::SystemSample => integer(key).default(15),
        Key::HeartbeatSeconds => integer(key).default(30),
        Key::SummaryErrors => integer(key),
        Key::ConfigDict => Property::object(key.as_str()),
        Key::SettingsSystemSpec => string(key)
            .default("~/.config/wandb/settings")
            .hook(expand_user),
        Key::SettingsWorkspaceSpec => string(key).default("settings").hook(in_wandb_dir),
        Key::SyncDirSpec => string(key).hook(run_dir),
        Key::SyncFileSpec => string(key).hook(sync_file_name),
        Key::SyncSymlinkLatestSpec => string(key).default("latest-run").hook(in_wandb_dir),
        Key::LogDirSpec => string(key).default("logs").hook(in_run_dir),
        Key::LogUserSpec => string(key).default("debug.log"),
        Key::LogInternalSpec => string(key).default("debug-internal.log"),
        Key::LogSymlinkUserSpec => string(key).default("debug.log").hook(in_wandb_dir),
        Key::LogSymlinkInternalSpec => {
            string(key).default("debug-internal.log").hook(in_wandb_dir)
        }
        Key::ResumeFnameSpec => string(key).default("wandb-resume.json").hook(in_wandb_dir),
        Key::FilesDirSpec => string(key).default("files").hook(in_run_dir),
        Key::TmpDirSpec => string(key).default("tmp").hook(in_run_dir),
        Key::CliOnlyMode => flag(key).help("Avoid running any code specific for runs"),
        Key::DisableViewer => flag(key).help("Prevent early viewer query"),
        Key::SaveRequirements => flag(key).default(true),
        Key::InternalQueueTimeout => number(key).default(2),
        Key::InternalCheckProcess => number(key).default(8),
        Key::Args => Property::list(key.as_str()),
        Key::LolId => string(key)
            .default("abc123")
            .preprocessor(to_string())
            .hook(join_with_base_url),
        Key::MeaningOfLife => integer(key).default("42").preprocessor(to_int()).policy(),
        Key::Force
        | Key::SaveCode
        | Key::DisableCode
        | Key::DisableGit
        | Key::Launch
        | Key::Quiet
        | Key::Strict
        | Key::LabelDisable
        | Key::SagemakerDisable
        | Key::ExceptExit
        | Key::AllowValChange
        | Key::Relogin
        | Key::Symlink
        | Key::Reinit
        | Key::ShowColors
        | Key::ShowEmoji
        | Key::DisableMeta
        | Key::DisableStats
        | Key::Cuda => flag(key),
        Key::DebugLog
        | Key::RequireService
        | Key::ServiceTransport
        | Key::RunId
        | Key::SweepId
        | Key::LaunchConfigPath
        | Key::RootDir
        | Key::Username
        | Key::Email
        | Key::CodeDir
        | Key::ProgramRelpath
        | Key::Program
        | Key::NotebookName
        | Key::Host
        | Key::Resume
        | Key::Entity
        | Key::RunGroup
        | Key::RunName
        | Key::RunJobType
        | Key::RunNotes
        | Key::RunqueueItemId
        | Key::ApiKey
        | Key::SweepParamPath
        | Key::Docker
        | Key::JupyterPath
        | Key::JupyterName
        | Key::JupyterRoot
        | Key::Executable
        | Key::Os
        | Key::Python
        | Key::Kaggle => string(key),
    }
}

// =============================================================================
// Hooks
// =============================================================================

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

fn in_wandb_dir(value: Value, settings: &Settings) -> Value {
    path_value(&settings.wandb_dir().join(text(&value)))
}

fn in_run_dir(value: Value, settings: &Settings) -> Value {
    path_value(&settings.run_dir().join(text(&value)))
}

fn run_dir(_value: Value, settings: &Settings) -> Value {
    path_value(&settings.run_dir())
}

fn sync_file_name(_value: Value, settings: &Settings) -> Value {
    Value::String(format!(
        "run-{}.wandb",
        settings.run_id().unwrap_or_default()
    ))
}

fn join_with_base_url(value: Value, settings: &Settings) -> Value {
    let base = settings.base_url().unwrap_or_default();
    url::Url::parse(&base)
        .and_then(|base| base.join(text(&value)))
        .map_or(value, |joined| Value::String(joined.into()))
}

fn expand_user(value: Value, _settings: &Settings) -> Value {
    let path = PathBuf::from(text(&value));
    if !path.starts_with("~") {
        return value;
    }
    let Some(home) = dirs::home_dir() else {
        return value;
    };
    match path.strip_prefix("~") {
        Ok(rest) if !rest.as_os_str().is_empty() => path_value(&home.join(rest)),
        _ => path_value(&home),
    }
}
