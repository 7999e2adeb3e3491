use symkern::harness::{main_with_args, Family};

fn main() {
    env_logger::init();
    std::process::exit(main_with_args(Family::Trmm, std::env::args().skip(1)));
}
