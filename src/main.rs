fn main() {
    visualizer::run();
}
