use clap::Parser;
use mirra::commands::run;
use mirra::config::{self, Cli};
use mirra::StateStore;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let jobs = config::load_jobs(&cli.config)?;
    let jobs = config::select_jobs(jobs, &cli.job)?;

    println!("mirra v{}", mirra::VERSION);

    let mut state = StateStore::load(&cli.state);
    let report = run::run(&jobs, &mut state);

    if !report.all_succeeded() {
        anyhow::bail!(
            "{} of {} job(s) failed; their timestamps were not advanced",
            report.failed,
            report.total()
        );
    }

    Ok(())
}
