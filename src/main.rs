fn main() {
    std::process::exit(binaural_playlist_lib::run())
}
