extern crate order_placement_lib as lib;

fn main() {
    let config = lib::config::Config::new().expect("Can't load order screen configs. Please check your /config folder.");
    lib::start_session(config);
}
