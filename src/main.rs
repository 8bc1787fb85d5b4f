fn main() {
    cartaquery_lib::run()
}
