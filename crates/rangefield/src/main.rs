fn main() -> anyhow::Result<()> {
    rangefield::cli::run()
}
