//! Simple ray tracer example.
//!
//! Builds a small scene through the directive API and renders it with the
//! Blinn-Phong integrator to `simple_render.png`.

use lumo_core::ParamSet;
use lumo_renderer::{RenderContext, RunOptions, Vec3};

fn main() -> lumo_renderer::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Lumo Ray Tracer - Simple Example");
    println!("================================");

    let mut ctx = RenderContext::new();
    ctx.init(RunOptions::default());

    ctx.film(
        ParamSet::new()
            .with("x_res", 800)
            .with("y_res", 450)
            .with("filename", "simple_render.png")
            .with("gamma_corrected", true),
    );
    ctx.camera(ParamSet::new().with("type", "perspective").with("fovy", 35.0));
    ctx.look_at(
        ParamSet::new()
            .with("look_from", vec![0.0, 2.0, 8.0])
            .with("look_at", vec![0.0, 0.5, 0.0])
            .with("up", vec![0.0, 1.0, 0.0]),
    );
    ctx.integrator(ParamSet::new().with("type", "blinn_phong").with("depth", 3));
    ctx.accelerator(ParamSet::new().with("type", "bvh").with("max_prims_per_node", 2));

    ctx.world_begin();
    ctx.background(
        ParamSet::new()
            .with("type", "colors")
            .with("tl", vec![0.5, 0.7, 1.0])
            .with("tr", vec![0.5, 0.7, 1.0])
            .with("bl", vec![1.0, 1.0, 1.0])
            .with("br", vec![1.0, 1.0, 1.0]),
    );

    ctx.light(ParamSet::new().with("type", "ambient").with("L", vec![0.1, 0.1, 0.1]));
    ctx.light(
        ParamSet::new()
            .with("type", "point")
            .with("I", vec![0.7, 0.7, 0.7])
            .with("from", vec![-4.0, 6.0, 4.0]),
    );
    ctx.light(
        ParamSet::new()
            .with("type", "spot")
            .with("I", vec![0.6, 0.6, 0.5])
            .with("from", vec![4.0, 6.0, 2.0])
            .with("to", vec![0.0, 0.0, 0.0])
            .with("cutoff", 30.0)
            .with("falloff", 20.0),
    );

    // Ground
    ctx.make_named_material(
        "ground",
        &ParamSet::new()
            .with("type", "blinn")
            .with("ambient", vec![0.3, 0.3, 0.3])
            .with("diffuse", vec![0.5, 0.5, 0.5])
            .with("mirror", vec![0.2, 0.2, 0.2]),
    )?;
    ctx.named_material("ground")?;
    ctx.object(
        &ParamSet::new()
            .with("type", "trianglemesh")
            .with("ntriangles", 2)
            .with("indices", vec![0, 1, 2, 0, 2, 3])
            .with(
                "vertices",
                vec![-10.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0, -10.0, -10.0, 0.0, -10.0],
            ),
    )?;

    // A row of shiny spheres, one object instanced three times
    ctx.material(
        &ParamSet::new()
            .with("type", "blinn")
            .with("ambient", vec![0.2, 0.1, 0.1])
            .with("diffuse", vec![0.8, 0.2, 0.2])
            .with("specular", vec![0.8, 0.8, 0.8])
            .with("glossiness", 64.0),
    )?;
    ctx.object_begin("ball")?;
    ctx.object(&ParamSet::new().with("type", "sphere").with("center", vec![0.0, 1.0, 0.0]))?;
    ctx.object_end()?;

    for x in [-2.5, 0.0, 2.5] {
        ctx.push_ctm();
        ctx.translate(Vec3::new(x, 0.0, 0.0));
        ctx.object_instance("ball")?;
        ctx.pop_ctm()?;
    }

    if let Some(report) = ctx.world_end()? {
        println!(
            "Rendered {}x{} ({} primitives, {} lights) in {:.2?}",
            report.width, report.height, report.primitives, report.lights, report.elapsed
        );
        println!("Saved to {}", report.output.display());
    }

    ctx.clean_up();
    Ok(())
}
