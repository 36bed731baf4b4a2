mod common;

use clap::Parser;
use delim_cli::DelimCli;
use delim_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use rstest::rstest;
use similar_asserts::assert_eq;

#[test]
fn filters_stdin_to_stdout() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.arg("-D")
		.arg("name=world")
		.write_stdin("hello ${name}\nbye @name@\n")
		.assert()
		.success()
		.stdout("hello world\nbye world\n");

	Ok(())
}

#[test]
fn dash_reads_stdin() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.args(["-D", "a=1", "-"])
		.write_stdin("${a}${a}")
		.assert()
		.success()
		.stdout("11");

	Ok(())
}

#[test]
fn unresolved_placeholders_are_left_untouched() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.write_stdin("mail toto@titi.com about ${missing}")
		.assert()
		.success()
		.stdout("mail toto@titi.com about ${missing}");

	Ok(())
}

#[test]
fn filters_file_into_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("greeting.txt");
	let output = tmp.path().join("out/greeting.txt");
	std::fs::write(&input, "Hi ${who}, version ${version}.\n")?;

	common::delim_cmd(tmp.path())
		.args(["-D", "who=team", "-D", "version=1.2.0"])
		.arg("--output")
		.arg(&output)
		.arg(&input)
		.assert()
		.success()
		.stdout("");

	assert_eq!(
		std::fs::read_to_string(&output)?,
		"Hi team, version 1.2.0.\n"
	);

	Ok(())
}

#[test]
fn output_dir_keeps_file_names() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.txt"), "a=${value}")?;
	std::fs::write(tmp.path().join("b.txt"), "b=@value@")?;

	common::delim_cmd(tmp.path())
		.args(["-D", "value=42", "--output-dir", "dist", "a.txt", "b.txt"])
		.assert()
		.success();

	let dist = tmp.path().join("dist");
	assert_eq!(std::fs::read_to_string(dist.join("a.txt"))?, "a=42");
	assert_eq!(std::fs::read_to_string(dist.join("b.txt"))?, "b=42");

	Ok(())
}

#[test]
fn output_may_overwrite_its_own_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.txt"), "hello ${name}\n")?;

	common::delim_cmd(tmp.path())
		.args(["-D", "name=world", "-o", "a.txt", "a.txt"])
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("a.txt"))?,
		"hello world\n"
	);

	Ok(())
}

#[test]
fn output_dir_may_be_the_input_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.txt"), "a=${value}")?;

	common::delim_cmd(tmp.path())
		.args(["-D", "value=42", "--output-dir", ".", "a.txt"])
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(tmp.path().join("a.txt"))?, "a=42");

	Ok(())
}

#[test]
fn failed_read_leaves_existing_output_untouched() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bad.txt"), [b'o', b'k', 0xFF, b'!'])?;
	std::fs::write(tmp.path().join("out.txt"), "previous")?;

	common::delim_cmd(tmp.path())
		.args(["-o", "out.txt", "bad.txt"])
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("valid UTF-8"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("out.txt"))?, "previous");
	assert_eq!(std::fs::read_dir(tmp.path())?.count(), 2);

	Ok(())
}

#[test]
fn output_rejects_several_inputs() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.txt"), "a")?;
	std::fs::write(tmp.path().join("b.txt"), "b")?;

	common::delim_cmd(tmp.path())
		.args(["--output", "out.txt", "a.txt", "b.txt"])
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("--output accepts a single input"));

	assert!(!tmp.path().join("out.txt").exists());

	Ok(())
}

#[test]
fn escape_suppresses_substitution() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.args(["-D", "a=DONE_A", "--escape", "\\"])
		.write_stdin("literal \\${a} and ${a}")
		.assert()
		.success()
		.stdout("literal ${a} and DONE_A");

	common::delim_cmd(tmp.path())
		.args(["-D", "a=DONE_A", "--escape", "\\", "--preserve-escape"])
		.write_stdin("literal \\${a} and ${a}")
		.assert()
		.success()
		.stdout("literal \\${a} and DONE_A");

	Ok(())
}

#[test]
fn multiline_flag_allows_placeholders_across_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.args(["-d", "[[*]]", "-D", "a=A", "-D", "a\n=B"])
		.write_stdin("[[a]] [[a\n]]")
		.assert()
		.success()
		.stdout("A [[a\n]]");

	common::delim_cmd(tmp.path())
		.args(["-d", "[[*]]", "-D", "a=A", "-D", "a\n=B", "--multiline"])
		.write_stdin("[[a]] [[a\n]]")
		.assert()
		.success()
		.stdout("A B");

	Ok(())
}

#[test]
fn custom_delimiter_replaces_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.args(["--delimiter", "#{*}", "-D", "x=1"])
		.write_stdin("#{x} ${x} @x@")
		.assert()
		.success()
		.stdout("1 ${x} @x@");

	Ok(())
}

#[test]
fn invalid_delimiter_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.args(["--delimiter", "${*"])
		.write_stdin("text")
		.assert()
		.failure()
		.code(2)
		.stdout("")
		.stderr(predicates::str::contains("invalid filter configuration"));

	Ok(())
}

#[test]
fn missing_input_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.arg("does-not-exist.txt")
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("cannot open `does-not-exist.txt`"));

	Ok(())
}

#[test]
fn verbose_logs_go_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::delim_cmd(tmp.path())
		.args(["--verbose", "-D", "a=1"])
		.write_stdin("${a} ${b}")
		.assert()
		.success()
		.stdout("1 ${b}")
		.stderr(predicates::str::contains("filter configured"))
		.stderr(predicates::str::contains("unresolved placeholder").and(
			predicates::str::contains("\u{1b}[").not(),
		));

	Ok(())
}

#[rstest]
#[case::simple("name=world", ("name", "world"))]
#[case::empty_value("name=", ("name", ""))]
#[case::value_with_equals("url=a=b", ("url", "a=b"))]
fn parse_define_accepts_pairs(#[case] define: &str, #[case] expected: (&str, &str)) {
	let parsed = delim_cli::parse_define(define);
	assert_eq!(
		parsed,
		Ok((expected.0.to_string(), expected.1.to_string()))
	);
}

#[rstest]
#[case::missing_equals("name")]
#[case::empty_key("=value")]
fn parse_define_rejects_malformed_pairs(#[case] define: &str) {
	assert!(delim_cli::parse_define(define).is_err());
}

#[test]
fn cli_collects_repeated_flags() {
	let cli = DelimCli::parse_from([
		"delim", "-d", "${*}", "-d", "@", "-D", "a=1", "-D", "b=2", "--multiline", "in.txt",
	]);

	assert_eq!(cli.delimiters, vec!["${*}".to_string(), "@".to_string()]);
	assert_eq!(
		cli.defines,
		vec![
			("a".to_string(), "1".to_string()),
			("b".to_string(), "2".to_string())
		]
	);
	assert!(cli.multiline);
	assert!(!cli.preserve_escape);
	assert_eq!(cli.inputs.len(), 1);
}

#[test]
fn cli_rejects_contradicting_switches() {
	assert!(DelimCli::try_parse_from(["delim", "--multiline", "--no-multiline"]).is_err());
	assert!(
		DelimCli::try_parse_from(["delim", "--preserve-escape", "--no-preserve-escape"]).is_err()
	);
}

#[test]
fn cli_rejects_output_with_output_dir() {
	let result = DelimCli::try_parse_from(["delim", "-o", "out.txt", "--output-dir", "dist"]);
	assert!(result.is_err());
}
