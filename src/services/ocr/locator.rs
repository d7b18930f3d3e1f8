use crate::error::{OcrError, Result};
use std::ffi::OsStr;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Command name looked up through the search path when no install location matches
pub const TESSERACT_COMMAND: &str = "tesseract";

/// Bound on the `--version` probe used while locating the engine
pub const LOCATE_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One place the tesseract executable might live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCandidate {
    /// Absolute or relative path to the executable
    Path(PathBuf),
    /// Bare command name resolved through `PATH`
    Command(String),
}

impl EngineCandidate {
    /// What to hand to `Command::new`
    pub fn program(&self) -> &OsStr {
        match self {
            EngineCandidate::Path(path) => path.as_os_str(),
            EngineCandidate::Command(name) => OsStr::new(name),
        }
    }
}

impl fmt::Display for EngineCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCandidate::Path(path) => write!(f, "{}", path.display()),
            EngineCandidate::Command(name) => f.write_str(name),
        }
    }
}

/// The accepted engine location. Resolved once, never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRef {
    candidate: EngineCandidate,
}

impl EngineRef {
    pub fn new(candidate: EngineCandidate) -> Self {
        Self { candidate }
    }

    pub fn candidate(&self) -> &EngineCandidate {
        &self.candidate
    }

    pub fn program(&self) -> &OsStr {
        self.candidate.program()
    }
}

impl fmt::Display for EngineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.candidate.fmt(f)
    }
}

/// Decides whether a candidate is usable
pub trait CandidateProbe {
    fn accepts(&self, candidate: &EngineCandidate) -> bool;
}

/// Probe against the real system: paths must exist, bare commands must answer `--version`
#[derive(Debug, Clone)]
pub struct SystemProbe {
    timeout: Duration,
}

impl SystemProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new(LOCATE_PROBE_TIMEOUT)
    }
}

impl CandidateProbe for SystemProbe {
    fn accepts(&self, candidate: &EngineCandidate) -> bool {
        match candidate {
            // Existence only; the executable is exercised before each extraction
            EngineCandidate::Path(path) => path.exists(),
            EngineCandidate::Command(_) => match probe_version(candidate.program(), self.timeout) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(candidate = %candidate, error = %e, "command probe failed");
                    false
                }
            },
        }
    }
}

/// Finds the tesseract executable by walking an ordered candidate list
pub struct EngineLocator<P: CandidateProbe = SystemProbe> {
    candidates: Vec<EngineCandidate>,
    probe: P,
}

impl EngineLocator<SystemProbe> {
    /// Locator over the default candidates, with `hint` tried first
    pub fn new(hint: Option<&Path>) -> Self {
        Self::with_candidates(Self::default_candidates(hint), SystemProbe::default())
    }

    /// Hint, then platform install locations, then the bare command name
    pub fn default_candidates(hint: Option<&Path>) -> Vec<EngineCandidate> {
        let mut candidates = Vec::new();

        if let Some(hint) = hint.filter(|h| !h.as_os_str().is_empty()) {
            // The bare command name as a hint means "whatever PATH resolves"
            if hint.as_os_str() == TESSERACT_COMMAND {
                candidates.push(EngineCandidate::Command(TESSERACT_COMMAND.to_string()));
            } else {
                candidates.push(EngineCandidate::Path(hint.to_path_buf()));
            }
        }
        candidates.extend(platform_install_paths().into_iter().map(EngineCandidate::Path));
        candidates.push(EngineCandidate::Command(TESSERACT_COMMAND.to_string()));

        candidates
    }
}

impl<P: CandidateProbe> EngineLocator<P> {
    pub fn with_candidates(candidates: Vec<EngineCandidate>, probe: P) -> Self {
        Self { candidates, probe }
    }

    /// Accept the first candidate the probe approves
    pub fn locate(&self) -> Result<EngineRef> {
        for candidate in &self.candidates {
            tracing::debug!(candidate = %candidate, "probing tesseract candidate");

            if self.probe.accepts(candidate) {
                tracing::info!(engine = %candidate, "using tesseract");
                return Ok(EngineRef::new(candidate.clone()));
            }
        }

        Err(OcrError::EngineNotFound {
            tried: self.candidates.iter().map(|c| c.to_string()).collect(),
        })
    }
}

#[cfg(target_os = "windows")]
fn platform_install_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"),
        PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"),
    ];
    // Per-user installer: %LOCALAPPDATA%\Programs\Tesseract-OCR
    if let Some(local) = dirs::data_local_dir() {
        paths.push(
            local
                .join("Programs")
                .join("Tesseract-OCR")
                .join("tesseract.exe"),
        );
    }
    paths
}

#[cfg(target_os = "macos")]
fn platform_install_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/opt/homebrew/bin/tesseract"),
        PathBuf::from("/usr/local/bin/tesseract"),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_install_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/tesseract"),
        PathBuf::from("/usr/local/bin/tesseract"),
    ]
}

/// Run `<program> --version` and return its first output line
pub fn probe_version(program: &OsStr, timeout: Duration) -> Result<String> {
    let mut command = Command::new(program);
    command.arg("--version");

    let output = run_with_timeout(&mut command, timeout)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        return Err(OcrError::EngineValidation(format!(
            "{} --version exited with {}: {}",
            Path::new(program).display(),
            output.status,
            stderr.trim()
        )));
    }

    // Older releases print the banner on stderr
    let banner = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    Ok(banner)
}

/// Run a command to completion, killing it once `timeout` has elapsed.
///
/// stdout and stderr are drained on helper threads so a chatty child cannot stall on
/// a full pipe. On timeout the readers are detached; they end when the pipes close.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<Output> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            OcrError::EngineValidation(format!(
                "failed to run {}: {}",
                Path::new(command.get_program()).display(),
                e
            ))
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Output {
                status,
                stdout: stdout.join().unwrap_or_default(),
                stderr: stderr.join().unwrap_or_default(),
            });
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(OcrError::EngineValidation(format!(
                "{} timed out after {:?}",
                Path::new(command.get_program()).display(),
                timeout
            )));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
