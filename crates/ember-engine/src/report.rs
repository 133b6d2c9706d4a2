//! Diagnostic state printer.

use std::io::{self, Write};

use ember_core::{Discretization, GridView};

use crate::controller::StepObserver;

/// Writes the leading rows of the grid after every step.
///
/// Output per step:
///
/// ```text
/// ### time step(3)  0.008523
/// [0] :100.000000 100.000000 ...
/// [1] :...
/// ```
///
/// The first write error is kept and every later step is skipped; it is
/// returned by [`StatePrinter::finish`].
#[derive(Debug)]
pub struct StatePrinter<W: Write> {
    out: W,
    disc: Discretization,
    max_rows: usize,
    error: Option<io::Error>,
}

impl<W: Write> StatePrinter<W> {
    /// Rows printed per step unless overridden.
    pub const DEFAULT_ROWS: usize = 7;

    /// Printer writing to `out`; `disc` converts step counts to time.
    pub fn new(out: W, disc: Discretization) -> Self {
        Self {
            out,
            disc,
            max_rows: Self::DEFAULT_ROWS,
            error: None,
        }
    }

    /// Print at most `rows` rows per step.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows;
        self
    }

    /// Write one state block.
    pub fn print(&mut self, step: u64, grid: GridView<'_>) -> io::Result<()> {
        writeln!(self.out, "### time step({step})  {:.6} ", self.disc.time_at(step))?;
        for i in 0..grid.dims().rows().min(self.max_rows) {
            write!(self.out, "[{i}] :")?;
            for v in grid.row(i) {
                write!(self.out, "{v:.6} ")?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Flush and return the writer, or the first error seen.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> StepObserver for StatePrinter<W> {
    fn on_step(&mut self, step: u64, _residual: f64, grid: GridView<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.print(step, grid) {
            self.error = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{GridDims, HeatConfig};

    fn disc(dims: GridDims) -> Discretization {
        HeatConfig::default().discretize(dims).unwrap()
    }

    #[test]
    fn prints_header_and_rows() {
        let dims = GridDims::new(2, 1).unwrap();
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let grid = GridView::new(&values, dims).unwrap();

        let mut printer = StatePrinter::new(Vec::new(), disc(dims));
        printer.print(0, grid).unwrap();
        let text = String::from_utf8(printer.finish().unwrap()).unwrap();

        assert_eq!(
            text,
            "### time step(0)  0.000000 \n\
             [0] :1.000000 2.000000 \n\
             [1] :3.000000 4.000000 \n\
             [2] :5.000000 6.000000 \n"
        );
    }

    #[test]
    fn row_count_is_limited() {
        let dims = GridDims::new(20, 2).unwrap();
        let values = vec![0.0; dims.cell_count()];
        let grid = GridView::new(&values, dims).unwrap();

        let mut printer = StatePrinter::new(Vec::new(), disc(dims));
        printer.on_step(1, 0.0, grid);
        printer.on_step(2, 0.0, grid);
        let text = String::from_utf8(printer.finish().unwrap()).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("###")).count(), 2);
        assert_eq!(text.lines().filter(|l| l.starts_with('[')).count(), 14);
        assert!(text.contains("[6] :"));
        assert!(!text.contains("[7] :"));
    }

    #[derive(Debug)]
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn first_write_error_is_kept() {
        let dims = GridDims::new(2, 2).unwrap();
        let values = vec![0.0; dims.cell_count()];
        let grid = GridView::new(&values, dims).unwrap();

        let mut printer = StatePrinter::new(Broken, disc(dims));
        printer.on_step(1, 0.0, grid);
        printer.on_step(2, 0.0, grid);
        let err = printer.finish().unwrap_err();
        assert_eq!(err.to_string(), "closed");
    }
}
