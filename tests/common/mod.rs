#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use plox::Lox;
            use std::cell::RefCell;
            use std::io::Write;
            use std::rc::Rc;

            #[derive(Clone)]
            struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

            impl Write for SharedBuffer {
                fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                    self.0.borrow_mut().write(buf)
                }
                fn flush(&mut self) -> std::io::Result<()> {
                    self.0.borrow_mut().flush()
                }
            }

            let mut expected = vec![$($expected),*];

            // if non-empty, concat expected lines with newlines and a trailing one
            let expected = match expected.len() {
                0 => "".to_string(),
                _ => {
                    expected.push("");
                    expected.join("\n")
                }
            };

            let buffer = Rc::new(RefCell::new(Vec::new()));
            let mut lox = Lox::with_writer(SharedBuffer(Rc::clone(&buffer)));

            lox.run_file(&format!("tests/target/{}/{}.lox", stringify!($scope), stringify!($file)))
                .expect("fixture file should be readable");

            let output = buffer.borrow();
            assert_eq!(expected, std::str::from_utf8(&output).unwrap());
        }
    };

    ($file:ident in $scope:ident is ERR $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/target/{}/{}.lox", stringify!($scope), stringify!($file));

            Command::cargo_bin("plox").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .failure();
        }
    };
}
