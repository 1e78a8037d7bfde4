fn main() {
    strategy_sim::cli::run();
}
