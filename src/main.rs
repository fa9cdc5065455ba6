fn main() -> anyhow::Result<()> {
    joymon_lib::run()
}
