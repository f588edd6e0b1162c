use std::env;
use std::process::exit;

use gyre::config::Config;
use gyre::quaternion::Quaternion;
use gyre::matrix::Mat4;

fn main() {
    env_logger::init();

    let config = match Config::new(env::args().skip(1).collect()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };
    log::info!("parsed orientation config:{config}");

    let target = config.orientation();
    let start = Quaternion::identity();

    if config.steps <= 1 {
        println!("{}", css_matrix3d(&target.to_matrix()));
    }
    else {
        for i in 0..=config.steps {
            let t = i as f32 / config.steps as f32;
            let q = start.slerp(target, t);
            println!("{}", css_matrix3d(&q.to_matrix()));
        }
    }
}

/// CSS matrix3d() takes its 16 elements in column-major order.
fn css_matrix3d(m: &Mat4) -> String {
    let vals = m.transposed().m
        .iter()
        .map(|v| format!("{v:.6}"))
        .collect::<Vec<String>>()
        .join(", ");

    format!("matrix3d({vals})")
}
