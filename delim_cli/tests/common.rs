use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn delim_cmd(dir: &std::path::Path) -> Command {
	let mut cmd = Command::new(get_cargo_bin("delim"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG").current_dir(dir);
	cmd
}
