fn main() -> anyhow::Result<()> {
    modelimpex::cli::run_cli()
}
