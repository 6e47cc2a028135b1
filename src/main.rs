fn main() -> anyhow::Result<()> {
    rename_with_llm::run()
}
