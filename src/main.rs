fn main() {
    if let Err(err) = wordcloud_rs_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
