//! Python bindings, built with the `python` feature.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::abstract_plants::Genotype;
use crate::error::Error;
use crate::plants::species::Species;
use crate::solution::BreedTree;
use crate::solvers::breed_goals::find_breed_trees_of_goals;
use crate::solvers::breed_tree::find_breed_tree_with_cost;
use crate::solvers::BreedOptions;

/// `(parent1, parent2, children)` as genotype strings.
type PyCross = (String, String, Vec<String>);
type PySchedule = (f64, Vec<PyCross>);

impl From<Error> for PyErr {
    fn from(e: Error) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

fn parse_all(species: Species, genotypes: &[String]) -> PyResult<Vec<Genotype>> {
    genotypes
        .iter()
        .map(|s| {
            let genotype: Genotype = s.parse()?;
            if !species.contains(genotype) {
                return Err(Error::UnknownGenotype {
                    species,
                    genotype: s.clone(),
                }
                .into());
            }
            Ok(genotype)
        })
        .collect()
}

fn schedule(cost: f64, tree: &BreedTree) -> PySchedule {
    let crosses = tree
        .to_crosses()
        .into_iter()
        .map(|c| {
            (
                c.parent1.to_string(),
                c.parent2.to_string(),
                c.children.iter().map(Genotype::to_string).collect(),
            )
        })
        .collect();
    (cost, crosses)
}

/// Runs `job` on a worker thread, giving up after `timeout` seconds.
fn with_timeout<T: Send + 'static>(
    timeout: Option<u64>,
    job: impl FnOnce() -> T + Send + 'static,
) -> Option<T> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || tx.send(job()));
    rx.recv_timeout(Duration::new(timeout.unwrap_or(u64::MAX), 0))
        .ok()
}

/// Cheapest schedule breeding `target` from `roots`, or `None` if there is none or the
/// timeout expired.
#[pyfunction]
#[pyo3(signature = (species, roots, target, distinguish_only_by_color=true, timeout=None))]
fn find_breed_tree(
    species: &str,
    roots: Vec<String>,
    target: String,
    distinguish_only_by_color: bool,
    timeout: Option<u64>,
) -> PyResult<Option<PySchedule>> {
    let species: Species = species.parse()?;
    let roots = parse_all(species, &roots)?;
    let target = parse_all(species, &[target])?[0];
    let options = BreedOptions {
        distinguish_only_by_color,
    };
    let res = with_timeout(timeout, move || {
        find_breed_tree_with_cost(species, &roots, target, &options)
    });
    match res {
        None => Ok(None),
        Some(found) => Ok(found?.map(|(cost, tree)| schedule(cost, &tree))),
    }
}

/// Schedules ending in a cross that yields any of `goals`, cheapest first, or `None` if the
/// timeout expired.
#[pyfunction]
#[pyo3(
    name = "find_breed_trees_of_goals",
    signature = (species, starts, goals, distinguish_only_by_color=true, timeout=None)
)]
fn find_breed_trees_of_goals_python(
    species: &str,
    starts: Vec<String>,
    goals: Vec<String>,
    distinguish_only_by_color: bool,
    timeout: Option<u64>,
) -> PyResult<Option<Vec<PySchedule>>> {
    let species: Species = species.parse()?;
    let starts = parse_all(species, &starts)?;
    let goals = parse_all(species, &goals)?;
    let options = BreedOptions {
        distinguish_only_by_color,
    };
    let res = with_timeout(timeout, move || {
        find_breed_trees_of_goals(species, &starts, &goals, &options)
    });
    let Some(trees) = res else {
        return Ok(None);
    };
    trees?
        .iter()
        .map(|tree| Ok(schedule(tree.cost()?, tree)))
        .collect::<PyResult<Vec<_>>>()
        .map(Some)
}

#[pymodule]
fn mendel_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(find_breed_tree, m)?)?;
    m.add_function(wrap_pyfunction!(find_breed_trees_of_goals_python, m)?)?;
    Ok(())
}
