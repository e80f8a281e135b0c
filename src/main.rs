fn main() -> anyhow::Result<()> {
    bagelverse::app::run()
}
