//! Bootstrap shared by the workspace binaries: directories, logging and the
//! Bevy app wrapper.

pub mod logging;
pub mod paths;

use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;

use crate::paths::PathContext;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub const LOG_MAIN: &str = "platformer::main";
pub const LOG_CONTROLLER: &str = "platformer::controller";
pub const LOG_INPUT: &str = "platformer::input";
pub const LOG_SETTINGS: &str = "platformer::settings";

/// Identity of a binary. Only the constants matter.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "chicken105";
    const PROJECT_ID: &'static str = "platformer";

    /// Debug builds keep their data in `.out/` at the workspace root.
    fn path_context() -> PathContext {
        #[cfg(debug_assertions)]
        let paths = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../.out"),
            Self::STUDIO,
            Self::PROJECT_ID,
            Self::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let paths = PathContext::new(Self::STUDIO, Self::PROJECT_ID, Self::APP_ID);
        paths
    }
}

/// Everything a running binary needs to keep around.
pub struct AppContext {
    paths: PathContext,
    version: &'static str,
    _log_guard: WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.paths.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.paths
    }
}

pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Creates the data directories and installs logging.
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        let paths = A::path_context();
        paths.ensure_directories()?;
        let guard = logging::init(&paths.log_file_now())?;

        tracing::info!(
            target: LOG_MAIN,
            "{} v{version} using {}",
            A::APP_ID,
            paths.project_root().display()
        );

        Ok(Self {
            context: AppContext {
                paths,
                version,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Hands a fresh Bevy `App` to `configure` and wraps the result.
    ///
    /// ```ignore
    /// let mut app = AppBuilder::<Demo>::new("0.1.0")?.build_with_bevy(|mut app, _ctx| {
    ///     app.add_plugins(DefaultPlugins.build().disable::<LogPlugin>());
    ///     app
    /// });
    /// app.run();
    /// ```
    #[cfg(feature = "bevy")]
    pub fn build_with_bevy(
        self,
        configure: impl FnOnce(bevy::prelude::App, &AppContext) -> bevy::prelude::App,
    ) -> BevyApp<A> {
        let app = configure(bevy::prelude::App::new(), &self.context);
        BevyApp {
            context: self.context,
            app,
            _marker: PhantomData,
        }
    }
}

/// A configured Bevy app. Owns the [`AppContext`] so the log writer outlives it.
#[cfg(feature = "bevy")]
pub struct BevyApp<A: Application> {
    context: AppContext,
    app: bevy::prelude::App,
    _marker: PhantomData<A>,
}

#[cfg(feature = "bevy")]
impl<A: Application> BevyApp<A> {
    pub fn run(&mut self) -> bevy::app::AppExit {
        tracing::info!(target: LOG_MAIN, "Running {} v{}", self.context.app_id(), self.context.version());
        self.app.run()
    }
}
