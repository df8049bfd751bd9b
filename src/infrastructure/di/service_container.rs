//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ArtifactResolver, InteractionShell, ProcessInvoker};
use crate::config::Settings;
use crate::domain::Platform;
use crate::infrastructure::traits::{
    CommandRunner, Console, FileSystem, RealCommandRunner, RealFileSystem, StdConsole,
};

/// Container holding all application services' dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Target platform, decided once at startup
    pub platform: Option<Platform>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Operator console abstraction
    pub console: Arc<dyn Console>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, platform: Option<Platform>) -> Self {
        Self::with_deps(
            settings,
            platform,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
            Arc::new(StdConsole),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        platform: Option<Platform>,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            platform,
            fs,
            cmd,
            console,
        }
    }

    pub fn resolver(&self) -> ArtifactResolver {
        ArtifactResolver::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.cmd),
            Arc::clone(&self.settings),
            self.platform,
        )
    }

    pub fn shell(&self) -> InteractionShell {
        InteractionShell::new(Arc::clone(&self.console))
    }

    pub fn invoker(&self) -> ProcessInvoker {
        ProcessInvoker::new(
            Arc::clone(&self.cmd),
            Arc::clone(&self.settings),
            self.platform,
        )
    }
}
