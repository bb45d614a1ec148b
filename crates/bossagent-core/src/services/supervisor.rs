//! Backend process supervisor
//! Owns the single backend subprocess for the lifetime of the host

use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::config::BACKEND_HOST;
use crate::error::{HostError, HostResult};

/// Environment variable carrying the per-user writable data directory
pub const ENV_DATA_DIR: &str = "BOSS_DATA_DIR";

#[cfg(unix)]
const STOP_GRACE: std::time::Duration = std::time::Duration::from_secs(1);
#[cfg(unix)]
const STOP_POLL: std::time::Duration = std::time::Duration::from_millis(50);

/// How the backend is shipped with the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Bundled executable under `<resources_dir>/backend/`
    Packaged { resources_dir: PathBuf },
    /// Interpreter running the server script
    Script {
        interpreter: Option<String>,
        script: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub mode: LaunchMode,
    pub data_dir: PathBuf,
}

/// Fully resolved command line for one launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    pub fn resolve(mode: &LaunchMode, port: u16, data_dir: &Path) -> Self {
        let (command, mut args) = match mode {
            LaunchMode::Packaged { resources_dir } => (
                resources_dir.join("backend").join(backend_executable_name()),
                Vec::new(),
            ),
            LaunchMode::Script {
                interpreter,
                script,
            } => (
                PathBuf::from(interpreter.as_deref().unwrap_or(default_interpreter())),
                vec![script.display().to_string()],
            ),
        };

        args.extend([
            "--host".to_string(),
            BACKEND_HOST.to_string(),
            "--port".to_string(),
            port.to_string(),
        ]);

        Self {
            command,
            args,
            env: vec![(ENV_DATA_DIR.to_string(), data_dir.display().to_string())],
        }
    }
}

pub fn backend_executable_name() -> &'static str {
    if cfg!(windows) {
        "backend.exe"
    } else {
        "backend"
    }
}

pub fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// Running backend process
pub struct BackendHandle {
    child: Child,
    spec: LaunchSpec,
}

impl BackendHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }
}

/// What the host reports about a launched backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub pid: u32,
    pub command: String,
    pub args: Vec<String>,
}

/// Process Supervisor - exclusive owner of the backend handle
pub struct ProcessSupervisor {
    plan: LaunchPlan,
    handle: Mutex<Option<BackendHandle>>,
}

impl ProcessSupervisor {
    pub fn new(plan: LaunchPlan) -> Self {
        Self {
            plan,
            handle: Mutex::new(None),
        }
    }

    /// Spawn the backend on `port` with its standard streams discarded.
    pub fn start(&self, port: u16) -> HostResult<BackendInfo> {
        let mut handle = self.handle.lock();

        if let Some(existing) = handle.as_mut() {
            match existing.child.try_wait() {
                Ok(None) => {
                    return Err(HostError::AlreadyRunning {
                        pid: existing.pid(),
                    })
                }
                _ => {
                    // Exited on its own; reap and allow a fresh launch
                    handle.take();
                }
            }
        }

        if let Err(e) = std::fs::create_dir_all(&self.plan.data_dir) {
            log::warn!(
                "[Supervisor] Could not create data dir {}: {}",
                self.plan.data_dir.display(),
                e
            );
        }

        let spec = LaunchSpec::resolve(&self.plan.mode, port, &self.plan.data_dir);
        let mut command = Command::new(&spec.command);
        command
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        configure_platform(&mut command);

        let child = command.spawn().map_err(|source| HostError::Launch {
            command: spec.command.display().to_string(),
            source,
        })?;

        let info = BackendInfo {
            pid: child.id(),
            command: spec.command.display().to_string(),
            args: spec.args.clone(),
        };
        log::info!(
            "[Supervisor] Backend started: {} {} (pid {})",
            info.command,
            info.args.join(" "),
            info.pid
        );

        *handle = Some(BackendHandle { child, spec });
        Ok(info)
    }

    /// Terminate the backend. Best-effort and idempotent; never fails.
    pub fn stop(&self) {
        let Some(mut backend) = self.handle.lock().take() else {
            return;
        };
        let pid = backend.pid();
        log::info!(
            "[Supervisor] Stopping backend {} (pid {})",
            backend.spec().command.display(),
            pid
        );

        // Kill process group (backend + anything it spawned)
        #[cfg(unix)]
        {
            unsafe {
                libc::kill(-(pid as i32), libc::SIGTERM);
            }
            let deadline = std::time::Instant::now() + STOP_GRACE;
            while std::time::Instant::now() < deadline {
                match backend.child.try_wait() {
                    Ok(Some(_)) | Err(_) => break,
                    Ok(None) => std::thread::sleep(STOP_POLL),
                }
            }
            unsafe {
                libc::kill(-(pid as i32), libc::SIGKILL);
            }
        }

        let _ = backend.child.kill();
        // Wait for child to prevent zombies
        let _ = backend.child.wait();
    }

    /// Whether a backend is live. Reaps and clears a handle whose process exited.
    pub fn is_running(&self) -> bool {
        let mut handle = self.handle.lock();
        let exited = match handle.as_mut() {
            None => return false,
            Some(backend) => !matches!(backend.child.try_wait(), Ok(None)),
        };
        if exited {
            if let Some(backend) = handle.take() {
                log::warn!("[Supervisor] Backend (pid {}) exited on its own", backend.pid());
            }
        }
        !exited
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.lock().as_ref().map(BackendHandle::pid)
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn configure_platform(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // Own process group so stop() can signal the whole tree
    command.process_group(0);

    // Have the kernel signal the backend if the host dies without cleanup
    #[cfg(target_os = "linux")]
    unsafe {
        command.pre_exec(|| {
            libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
            Ok(())
        });
    }
}

#[cfg(windows)]
fn configure_platform(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(any(unix, windows)))]
fn configure_platform(_command: &mut Command) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_plan(interpreter: &str, script: &Path, data_dir: &Path) -> LaunchPlan {
        LaunchPlan {
            mode: LaunchMode::Script {
                interpreter: Some(interpreter.to_string()),
                script: script.to_path_buf(),
            },
            data_dir: data_dir.to_path_buf(),
        }
    }

    #[test]
    fn packaged_launch_uses_bundled_executable() {
        let spec = LaunchSpec::resolve(
            &LaunchMode::Packaged {
                resources_dir: PathBuf::from("/app/resources"),
            },
            8765,
            Path::new("/home/me/.local/share/bossagent"),
        );
        assert_eq!(
            spec.command,
            PathBuf::from("/app/resources")
                .join("backend")
                .join(backend_executable_name())
        );
        assert_eq!(spec.args, vec!["--host", "127.0.0.1", "--port", "8765"]);
        assert_eq!(
            spec.env,
            vec![(
                ENV_DATA_DIR.to_string(),
                "/home/me/.local/share/bossagent".to_string()
            )]
        );
    }

    #[test]
    fn script_launch_prepends_script_path() {
        let spec = LaunchSpec::resolve(
            &LaunchMode::Script {
                interpreter: None,
                script: PathBuf::from("/repo/server.py"),
            },
            9001,
            Path::new("/tmp/data"),
        );
        assert_eq!(spec.command, PathBuf::from(default_interpreter()));
        assert_eq!(
            spec.args,
            vec!["/repo/server.py", "--host", "127.0.0.1", "--port", "9001"]
        );
    }

    #[test]
    fn stop_without_handle_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = ProcessSupervisor::new(script_plan("python3", Path::new("server.py"), dir.path()));
        supervisor.stop();
        supervisor.stop();
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.pid(), None);
    }

    #[test]
    fn launch_failure_leaves_handle_unset() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = ProcessSupervisor::new(script_plan(
            "/definitely/not/an/interpreter",
            Path::new("server.py"),
            dir.path(),
        ));
        let err = supervisor.start(8765).unwrap_err();
        assert!(matches!(err, HostError::Launch { .. }));
        assert!(err.is_bootstrap());
        assert_eq!(supervisor.pid(), None);
        supervisor.stop();
    }

    #[cfg(unix)]
    #[test]
    fn second_start_is_rejected_while_live() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("backend.sh");
        std::fs::write(&script, "exec sleep 30\n").unwrap();
        let supervisor = ProcessSupervisor::new(script_plan("sh", &script, &dir.path().join("data")));

        let info = supervisor.start(8765).unwrap();
        assert!(supervisor.is_running());
        assert_eq!(supervisor.pid(), Some(info.pid));
        assert!(dir.path().join("data").is_dir());

        let err = supervisor.start(8765).unwrap_err();
        assert!(matches!(err, HostError::AlreadyRunning { pid } if pid == info.pid));

        supervisor.stop();
        supervisor.stop();
        assert!(!supervisor.is_running());
    }
}
