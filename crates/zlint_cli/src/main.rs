use structopt::StructOpt;

use zlint_cli::Options;

fn main() {
    env_logger::init();
    let options = Options::from_args();
    std::process::exit(zlint_cli::run(options));
}
