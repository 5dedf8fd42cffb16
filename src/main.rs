fn main() -> anyhow::Result<()> {
    crm_filter::run()
}
