//! loopweave CLI.
//!
//! A thin driver over `loopweave-core`: prints a canonical expression and
//! runs the full lowering pipeline over a small built-in two-function
//! pipeline, useful for eyeballing what each schedule choice produces
//! without writing Rust.

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use loopweave_core::{
    lower, ArithOp, CallKind, CoreResult, Environment, ExprBuilder, Function, Symbol, Type,
};

/// loopweave compiler tools.
#[derive(Parser)]
#[command(name = "loopweave", about = "loopweave lowering pipeline tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of `(x + 3) * (y / 2 + 17)`.
    PrintExpr,

    /// Lower the built-in two-function demo pipeline (`g` called twice by
    /// `f`) and print the resulting statement tree.
    Lower {
        /// Whether `g` is scheduled at a compute level inside `f`, or left
        /// inlined at every call site.
        #[arg(long, value_enum, default_value = "chunked")]
        schedule: DemoSchedule,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum DemoSchedule {
    /// `g.chunk("f.y", "f.x_o")`.
    Chunked,
    /// `g` left at its default (inlined) schedule.
    Inline,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::PrintExpr => {
            run_print_expr();
            0
        }
        Commands::Lower { schedule, format } => run_lower(schedule, format),
    };
    process::exit(exit_code);
}

fn run_print_expr() {
    let x = ExprBuilder::variable(Type::int(32), "x");
    let y = ExprBuilder::variable(Type::int(32), "y");
    let three = ExprBuilder::int_imm(Type::int(32), 3).unwrap();
    let two = ExprBuilder::int_imm(Type::int(32), 2).unwrap();
    let seventeen = ExprBuilder::int_imm(Type::int(32), 17).unwrap();

    let lhs = ExprBuilder::arith(ArithOp::Add, x, three).expect("well-typed operands");
    let y_div_2 = ExprBuilder::arith(ArithOp::Div, y, two).expect("well-typed operands");
    let rhs = ExprBuilder::arith(ArithOp::Add, y_div_2, seventeen).expect("well-typed operands");
    let whole = ExprBuilder::arith(ArithOp::Mul, lhs, rhs).expect("well-typed operands");

    println!("{whole}");
}

/// Builds `g(x, y) = x - y` and `f(x, y) = g(x+1, 1) + g(3, x-y)`, `f`
/// split 4-wide on `x` with the inner half vectorized and the outer half
/// parallelized, `g` scheduled per `schedule`.
fn build_demo_environment(schedule: DemoSchedule) -> CoreResult<(Environment, Symbol)> {
    let i32_t = Type::int(32);
    let var = |name: &str| ExprBuilder::variable(i32_t, name);
    let imm = |n: i64| ExprBuilder::int_imm(i32_t, n);

    let g_body = ExprBuilder::arith(ArithOp::Sub, var("x"), var("y"))?;
    let mut g = Function::new("g", vec![Symbol::new("x"), Symbol::new("y")], g_body);
    match schedule {
        DemoSchedule::Chunked => {
            // `f`'s dims run innermost-to-outermost as [x_i, x_o, y], so the
            // store level (the allocation) must be at or outside the compute
            // level: store once per `y` iteration, recompute at each `x_o`.
            g.schedule.chunk("f.y", "f.x_o");
        }
        DemoSchedule::Inline => {}
    }

    let call_g1 = ExprBuilder::call(
        i32_t,
        "g",
        vec![ExprBuilder::arith(ArithOp::Add, var("x"), imm(1)?)?, imm(1)?],
        CallKind::Halide,
    );
    let call_g2 = ExprBuilder::call(
        i32_t,
        "g",
        vec![imm(3)?, ExprBuilder::arith(ArithOp::Sub, var("x"), var("y"))?],
        CallKind::Halide,
    );
    let f_body = ExprBuilder::arith(ArithOp::Add, call_g1, call_g2)?;
    let mut f = Function::new("f", vec![Symbol::new("x"), Symbol::new("y")], f_body);
    f.schedule
        .split("x", "x_o", "x_i", 4)
        .vectorize("x_i")
        .parallel("x_o");

    let mut env = Environment::new();
    env.insert(Symbol::new("g"), g);
    env.insert(Symbol::new("f"), f);
    Ok((env, Symbol::new("f")))
}

fn run_lower(schedule: DemoSchedule, format: OutputFormat) -> i32 {
    let (env, target) = match build_demo_environment(schedule) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "failed to build demo environment");
            eprintln!("Error: {e}");
            return 1;
        }
    };

    match lower(&env, &target) {
        Ok(stmt) => {
            match format {
                OutputFormat::Text => println!("{stmt}"),
                OutputFormat::Json => {
                    let payload = serde_json::json!({ "lowered": stmt.to_string() });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&payload).expect("JSON serialization")
                    );
                }
            }
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "lowering failed");
            eprintln!("Error: {e}");
            1
        }
    }
}
