use cucumber::{cli, World};
use cucumber_tests::features::world::FolioWorld;

#[tokio::main]
async fn main() {
    FolioWorld::cucumber()
        .with_cli::<()>(cli::Opts::parsed())
        .run_and_exit("features/")
        .await;
}
