use std::{io, num};

quick_error! {
    /// Reasons a sentence is rejected by the parser.
    ///
    /// A rejected sentence never produces a partial fix; the reader logs the
    /// rejection and moves on to the next line.
    #[derive(Debug)]
    pub enum ParseError {
        Checksum {
            description("Invalid checksum")
            display("Declared checksum does not match the computed XOR")
        }
        FieldCount(n: usize) {
            description("Unexpected field count")
            display("Expected 13 comma separated fields, found {}", n)
        }
        VoidFix {
            description("Void fix")
            display("Status field reports a void fix")
        }
        MalformedField(field: &'static str) {
            description("Malformed field")
            display("Field {} has an unexpected shape", field)
        }
        InvalidTimestamp {
            description("Invalid timestamp")
            display("Date or time fields form no valid UTC timestamp")
        }
        Int(err: num::ParseIntError) {
            from()
            description("Integer parsing error")
            display("{}", err)
            cause(err)
        }
        Float(err: num::ParseFloatError) {
            from()
            description("Float parsing error")
            display("{}", err)
            cause(err)
        }
    }
}

quick_error! {
    /// Lifecycle errors reported by [`Reader`](../reader/struct.Reader.html).
    #[derive(Debug)]
    pub enum ReaderError {
        AlreadyStarted {
            description("Reader already started")
            display("Start was called while the reader is running")
        }
        NotStarted {
            description("Reader not started")
            display("Stop was called while the reader is stopped")
        }
        Io(err: io::Error) {
            from()
            description("I/O error")
            display("Could not spawn the polling worker: {}", err)
            cause(err)
        }
    }
}
