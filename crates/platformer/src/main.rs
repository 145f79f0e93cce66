mod app;
mod level;

use bevy::app::AppExit;

fn main() -> anyhow::Result<()> {
    let mut app = app::init()?;
    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("platformer exited with code {code}"),
    }
}
