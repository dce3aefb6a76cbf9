use lilt::evaluator::Interp;
use lilt::parser::parse_source;
use lilt::value::Value;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

fn main() {
    println!("lilt interactive interpreter");
    println!("Enter forms like: (+ 1 2) or (defn inc [x] (+ x 1))");
    println!("Type :help for commands, or Ctrl+C to exit.");
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("could not initialize the line editor: {err}");
            return;
        }
    };
    let mut interp = Interp::new();

    loop {
        match rl.readline("lilt> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&interp);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                let exprs = match parse_source(line) {
                    Ok(exprs) => exprs,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                for expr in &exprs {
                    match interp.eval(expr) {
                        // nil results are not echoed, matching the host driver
                        Ok(Value::Nil) => {}
                        Ok(value) => println!("{}", value.to_display_string()),
                        Err(err) => {
                            println!("{err}");
                            break;
                        }
                    }
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show root environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("The language:");
    println!("  Literals:       42, 3.14, \"text\", :keyword, true, false, nil");
    println!("  Collections:    (list 1 2), [1 2 3], {{:name \"Alice\"}}");
    println!("  Definitions:    (def x 1), (defn f [a b] (+ a b))");
    println!("  Functions:      (fn [x] (* x x)), (let [y 2] (+ y 1))");
    println!("  Quoting:        'form, `(template ~hole ~@splice)");
    println!("  Macros:         (defmacro unless [c t e] `(if ~c ~e ~t))");
    println!();
}

fn print_environment(interp: &Interp) {
    let mut primitives = Vec::new();
    let mut user = Vec::new();
    for (name, value) in interp.root_bindings() {
        match value {
            Value::Primitive(_) => primitives.push(name),
            other => user.push((name, other)),
        }
    }

    if !primitives.is_empty() {
        println!("Primitives ({}):", primitives.len());
        let mut col = 0;
        for name in primitives {
            print!("  {name:<12}");
            col += 1;
            if col % 5 == 0 {
                println!();
            }
        }
        if col % 5 != 0 {
            println!();
        }
        println!();
    }

    if user.is_empty() {
        println!("No user definitions yet.");
    } else {
        println!("User definitions ({}):", user.len());
        for (name, value) in user {
            println!("  {name} = {value}");
        }
    }
}
