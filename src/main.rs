fn main() -> anyhow::Result<()> {
    mapgrab_lib::run()
}
