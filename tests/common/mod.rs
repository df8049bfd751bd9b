//! Shared mocks for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use sdboot::config::Settings;
use sdboot::domain::{ArtifactSpec, Platform};
use sdboot::infrastructure::traits::{CommandOutput, CommandRunner, Console};

/// One recorded external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub attached: bool,
}

/// Command runner that records calls instead of spawning processes.
///
/// Every program exits 0 unless configured otherwise. The transfer tool can
/// write a payload to its `-o` destination so the builtin hasher has
/// something real to read.
#[derive(Default)]
pub struct MockCommandRunner {
    calls: Mutex<Vec<Call>>,
    exit_codes: HashMap<String, i32>,
    unspawnable: HashSet<String>,
    stdout: HashMap<String, String>,
    download_payload: Option<Vec<u8>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit_code(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    pub fn with_stdout(mut self, program: &str, stdout: &str) -> Self {
        self.stdout.insert(program.to_string(), stdout.to_string());
        self
    }

    /// Make `program` fail to start, as if it were not installed.
    pub fn without_program(mut self, program: &str) -> Self {
        self.unspawnable.insert(program.to_string());
        self
    }

    pub fn with_download_payload(mut self, payload: &[u8]) -> Self {
        self.download_payload = Some(payload.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn record(&self, cmd: &str, args: &[&str], attached: bool) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(Call {
            program: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            attached,
        });

        if self.unspawnable.contains(cmd) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not installed"));
        }

        let code = self.exit_codes.get(cmd).copied().unwrap_or(0);
        if cmd == "curl" && code == 0 {
            if let Some(payload) = &self.download_payload {
                let dest = args
                    .iter()
                    .position(|a| *a == "-o")
                    .and_then(|i| args.get(i + 1))
                    .expect("curl called without -o");
                std::fs::write(dest, payload)?;
            }
        }

        Ok(CommandOutput {
            code: Some(code),
            stdout: self.stdout.get(cmd).cloned().unwrap_or_default(),
            stderr: String::new(),
        })
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        self.record(cmd, args, false)
    }

    fn run_attached(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        self.record(cmd, args, true)
    }
}

/// Console that answers from a script and records the questions asked.
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
    broken: bool,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: Mutex::new(Vec::new()),
            broken: false,
        }
    }

    /// A console whose stdin cannot be read.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::new(&[])
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        self.asked.lock().unwrap().push(prompt.to_string());
        if self.broken {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"));
        }
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Default layout rooted in `dir`, using the external checksum tool.
pub fn test_settings(dir: &Path) -> Settings {
    let mut settings = Settings::default().rooted_at(dir);
    settings.tools.checksum = "shasum".into();
    settings
}

/// `shasum -a 256` style output for the release bundle of `platform`.
pub fn matching_shasum_output(platform: Platform) -> String {
    let spec = ArtifactSpec::executable_bundle(platform);
    format!("{}  stable_diffusion.zip\n", spec.checksum.hex())
}

/// Create an empty file, including parent directories.
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
