use basic::mach::Runtime;

pub fn exec(runtime: &mut Runtime) -> String {
    runtime.console_mut().take_output()
}
